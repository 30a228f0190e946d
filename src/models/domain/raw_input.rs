/// The content a generation request resolves to before any text is analyzed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawInput {
    Text(String),
    FileReference { url: String, mime_type: String },
}

impl RawInput {
    pub fn kind(&self) -> &'static str {
        match self {
            RawInput::Text(_) => "text",
            RawInput::FileReference { .. } => "file",
        }
    }
}
