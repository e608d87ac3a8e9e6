use std::borrow::Cow;

const XML_DECLARATION: &str = "<?xml";

/// XML text recovered from a log file, borrowed when the file already is a
/// document and owned when it had to be cut out of surrounding output.
#[derive(Debug)]
pub struct EmbeddedXml<'a> {
    text: Cow<'a, str>,
}

impl<'a> EmbeddedXml<'a> {
    /// Cuts the XML document closed by `closing_tag` out of `content`.
    ///
    /// Content whose first line is the XML declaration is returned as is. Otherwise
    /// capture starts at the first line beginning with the declaration and ends
    /// with the first line beginning with `closing_tag`. When no complete
    /// embedded document exists the original content is returned, leaving the
    /// parse failure to the caller.
    pub fn extract(content: &'a str, closing_tag: &str) -> Self {
        let mut lines = content.split_inclusive('\n');
        match lines.next() {
            Some(first) if first.starts_with(XML_DECLARATION) => return Self::borrowed(content),
            None => return Self::borrowed(content),
            _ => {}
        }

        let mut buffer: Option<String> = None;
        for line in lines {
            if buffer.is_none() && line.starts_with(XML_DECLARATION) {
                buffer = Some(String::new());
            }
            if let Some(buffer) = buffer.as_mut() {
                buffer.push_str(line);
                if line.starts_with(closing_tag) {
                    return Self {
                        text: Cow::Owned(std::mem::take(buffer)),
                    };
                }
            }
        }

        Self::borrowed(content)
    }

    fn borrowed(content: &'a str) -> Self {
        Self {
            text: Cow::Borrowed(content),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether the document had to be cut out of surrounding text.
    pub fn is_extracted(&self) -> bool {
        matches!(self.text, Cow::Owned(_))
    }
}
