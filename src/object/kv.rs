//! shared codec for the commit/tag "ordered key/value lines, blank line,
//! message" payload format (spec §4.6).

use crate::error::Error;
use crate::Result;

/// one parsed key/value line, preserving encounter order; `gpgsig` values
/// may themselves contain embedded newlines (the PGP armored block).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvField {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KvPayload {
    pub fields: Vec<KvField>,
    pub message: String,
}

impl KvPayload {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.value.as_str())
    }

    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.key == key)
            .map(|f| f.value.as_str())
            .collect()
    }

    /// scan `bytes` into ordered fields plus a trailing message, per spec §4.6:
    /// a blank line ends the header and everything after it is the message
    /// verbatim. The `gpgsig` key is special: its value runs until the first
    /// `\n\n`, so an embedded PGP block's continuation lines survive.
    pub fn parse(bytes: &[u8], context: &'static str) -> Result<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|_| Error::malformed(context, "payload is not valid utf-8"))?;

        let mut fields = Vec::new();
        let mut rest = text;

        loop {
            if rest.starts_with('\n') {
                let message = rest[1..].to_string();
                return Ok(KvPayload { fields, message });
            }

            let space = rest
                .find(' ')
                .ok_or_else(|| Error::malformed(context, "header line missing space"))?;
            let key = &rest[..space];
            let after_key = &rest[space + 1..];

            if key == "gpgsig" {
                let end = after_key
                    .find("\n\n")
                    .ok_or_else(|| Error::malformed(context, "unterminated gpgsig block"))?;
                let value = after_key[..end].to_string();
                fields.push(KvField {
                    key: key.to_string(),
                    value,
                });
                // advance past the gpgsig line's own terminating newline;
                // cursor lands on the second of the two newlines, so the
                // blank-line rule above fires on the next iteration.
                rest = &after_key[end + 1..];
            } else {
                let newline = after_key
                    .find('\n')
                    .ok_or_else(|| Error::malformed(context, "header line missing newline"))?;
                let value = after_key[..newline].to_string();
                fields.push(KvField {
                    key: key.to_string(),
                    value,
                });
                rest = &after_key[newline + 1..];
            }
        }
    }

    /// serialize fields (in the order given) followed by a blank line and message
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = String::new();
        for field in &self.fields {
            out.push_str(&field.key);
            out.push(' ');
            out.push_str(&field.value);
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&self.message);
        out.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_commit_shape() {
        let raw = b"tree 7cee6dfa7d13e124220d2c04923f0cb0347ba27c\n\
author Moloch <pure_machinery@example.com> 1517911033 -0600\n\
committer Jaden Doe <j.doe@example.com> 1517914295 +0100\n\
\n\
Initial commit.\n";
        let parsed = KvPayload::parse(raw, "commit").unwrap();
        assert_eq!(
            parsed.get("tree"),
            Some("7cee6dfa7d13e124220d2c04923f0cb0347ba27c")
        );
        assert_eq!(parsed.message, "Initial commit.\n");
    }

    #[test]
    fn roundtrips_without_gpgsig() {
        let raw = b"tree aaaa\nparent bbbb\nauthor a\ncommitter b\n\nhello\n";
        let parsed = KvPayload::parse(raw, "commit").unwrap();
        assert_eq!(parsed.serialize(), raw);
    }

    #[test]
    fn gpgsig_block_is_preserved_across_continuation_lines() {
        let raw = b"tree aaaa\n\
author a\n\
committer b\n\
gpgsig -----BEGIN PGP SIGNATURE-----\n \n iQEzBAAB\n iQEzBAAB\n -----END PGP SIGNATURE-----\n\
\n\
msg\n";
        let parsed = KvPayload::parse(raw, "commit").unwrap();
        let sig = parsed.get("gpgsig").unwrap();
        assert!(sig.starts_with("-----BEGIN PGP SIGNATURE-----"));
        assert!(sig.contains("iQEzBAAB"));
        assert_eq!(parsed.message, "msg\n");
        assert_eq!(parsed.serialize(), raw);
    }

    #[test]
    fn missing_blank_line_is_malformed() {
        let raw = b"tree aaaa\nauthor a";
        assert!(KvPayload::parse(raw, "commit").is_err());
    }

    #[test]
    fn empty_message_round_trips() {
        let raw = b"tree aaaa\nauthor a\ncommitter b\n\n";
        let parsed = KvPayload::parse(raw, "commit").unwrap();
        assert_eq!(parsed.message, "");
        assert_eq!(parsed.serialize(), raw);
    }
}
