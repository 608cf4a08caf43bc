#[derive(Clone, Debug)]
pub struct RequestCycleSettings {
    /// Character encoding of responses; also named in the XML prolog and the
    /// `Content-Type` header.
    pub response_request_encoding: String,
}

impl Default for RequestCycleSettings {
    fn default() -> Self {
        Self {
            response_request_encoding: "UTF-8".to_string(),
        }
    }
}
