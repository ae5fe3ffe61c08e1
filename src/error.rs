use thiserror::Error;

#[derive(Error, Debug)]
pub enum FabricMapError {
    #[error("config error: {0}")]
    Config(String),

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("malformed knowledge base: {0}")]
    MalformedLibrary(String),

    #[error("review workbook error: {0}")]
    ReviewRead(String),

    #[error("excel generation error: {0}")]
    ExcelWrite(String),

    #[error("chat endpoint error: {0}")]
    ChatCall(String),

    #[error("chat response parse error: {0}")]
    ChatParse(String),

    #[error("unsupported input: {0}")]
    InputFormat(String),

    #[error("prompt error: {0}")]
    Prompt(String),

    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FabricMapError>;
