//! Fixtures shared by the parser benchmarks.

/// One benchmark input, fed either in one piece or in fixed-size chunks.
#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    file: TestFile,
    chunk_size: Option<usize>,
}

impl TestCase {
    pub fn whole(name: &'static str, file: TestFile) -> Self {
        Self { name, file, chunk_size: None }
    }

    pub fn chunked(name: &'static str, file: TestFile, chunk_size: usize) -> Self {
        Self { name, file, chunk_size: Some(chunk_size) }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn file(&self) -> &TestFile {
        &self.file
    }

    pub fn file_name(&self) -> &'static str {
        self.file().file_name
    }

    /// The content split the way the case feeds it.
    pub fn chunks(&self) -> std::slice::Chunks<'static, u8> {
        let content = self.file.content;
        content.chunks(self.chunk_size.unwrap_or(content.len()).max(1))
    }
}

#[derive(Debug, Copy, Clone)]
pub struct TestFile {
    file_name: &'static str,
    content: &'static [u8],
}

impl TestFile {
    pub const fn new(file_name: &'static str, content: &'static [u8]) -> Self {
        Self { file_name, content }
    }

    pub fn content(&self) -> &'static [u8] {
        self.content
    }

    pub fn file_name(&self) -> &'static str {
        self.file_name
    }
}
