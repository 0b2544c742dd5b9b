/// an opaque byte payload; serialization is the identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Blob {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.data.clone()
    }

    pub fn parse(bytes: &[u8]) -> Self {
        Self {
            data: bytes.to_vec(),
        }
    }
}
