use crate::error::Error;
use crate::hash::Hash;
use crate::object::kind::ObjectKind;
use crate::object::kv::{KvField, KvPayload};
use crate::Result;

/// an annotated tag payload: object, type, tag, tagger, optional gpgsig,
/// blank line, message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub object: Hash,
    pub object_kind: ObjectKind,
    pub tag: String,
    pub tagger: String,
    pub gpgsig: Option<String>,
    pub message: String,
}

impl Tag {
    pub fn new(
        object: Hash,
        object_kind: ObjectKind,
        tag: String,
        tagger: String,
        message: String,
    ) -> Self {
        Self {
            object,
            object_kind,
            tag,
            tagger,
            gpgsig: None,
            message,
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut fields = vec![
            KvField {
                key: "object".to_string(),
                value: self.object.to_hex(),
            },
            KvField {
                key: "type".to_string(),
                value: self.object_kind.as_str().to_string(),
            },
            KvField {
                key: "tag".to_string(),
                value: self.tag.clone(),
            },
            KvField {
                key: "tagger".to_string(),
                value: self.tagger.clone(),
            },
        ];
        if let Some(sig) = &self.gpgsig {
            fields.push(KvField {
                key: "gpgsig".to_string(),
                value: sig.clone(),
            });
        }
        KvPayload {
            fields,
            message: self.message.clone(),
        }
        .serialize()
    }

    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let kv = KvPayload::parse(bytes, "tag")?;

        let object = kv
            .get("object")
            .ok_or_else(|| Error::malformed("tag", "missing required 'object' field"))?;
        let object = Hash::from_hex(object)?;

        let object_kind = kv
            .get("type")
            .ok_or_else(|| Error::malformed("tag", "missing required 'type' field"))?;
        let object_kind = ObjectKind::parse(object_kind)?;

        let tag = kv
            .get("tag")
            .ok_or_else(|| Error::malformed("tag", "missing required 'tag' field"))?
            .to_string();
        let tagger = kv
            .get("tagger")
            .ok_or_else(|| Error::malformed("tag", "missing required 'tagger' field"))?
            .to_string();
        let gpgsig = kv.get("gpgsig").map(|s| s.to_string());

        Ok(Self {
            object,
            object_kind,
            tag,
            tagger,
            gpgsig,
            message: kv.message,
        })
    }
}
