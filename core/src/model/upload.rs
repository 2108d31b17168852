use bytes::Bytes;

/// A file received from a client, fully buffered in memory.
#[derive(Clone)]
pub struct Upload {
    pub bytes: Bytes,
    pub original_name: String,
    pub mime_type: String,
}

impl std::fmt::Debug for Upload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Upload")
            .field("len", &self.bytes.len())
            .field("original_name", &self.original_name)
            .field("mime_type", &self.mime_type)
            .finish()
    }
}
