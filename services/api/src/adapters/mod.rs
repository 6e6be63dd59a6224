pub mod cohere_llm;
pub mod extract;
pub mod openai_llm;

pub use cohere_llm::CohereCompletionAdapter;
pub use extract::default_dispatcher;
pub use openai_llm::OpenAiCompletionAdapter;
