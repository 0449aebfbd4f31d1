//! List Blobs response parsing.

use blobnav_core::backend::{BlobProperties, BlobRecord, Segment};
use blobnav_core::types::ContinuationToken;
use jiff::Timestamp;
use jiff::fmt::rfc2822::DateTimeParser;
use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::{Error, Result};

static RFC1123: DateTimeParser = DateTimeParser::new();

/// Returns `true` if the innermost open elements are `path`, outermost first.
fn at(stack: &[Vec<u8>], path: &[&str]) -> bool {
    stack.len() >= path.len()
        && stack[stack.len() - path.len()..]
            .iter()
            .zip(path)
            .all(|(open, expected)| open.as_slice() == expected.as_bytes())
}

/// Parses an `EnumerationResults` document into a segment.
///
/// Blobs and blob prefixes are returned in document order. An empty or
/// missing `NextMarker` means the enumeration is exhausted.
pub(crate) fn parse_enumeration(xml: &str) -> Result<Segment> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut text = String::new();
    let mut blob: Option<BlobProperties> = None;
    let mut records = Vec::new();
    let mut next_marker = None;
    let mut name_encoded = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                match e.name().as_ref() {
                    b"Blob" => blob = Some(BlobProperties::new(String::new())),
                    b"Name" => {
                        name_encoded = e
                            .try_get_attribute("Encoded")
                            .map_err(quick_xml::Error::from)?
                            .is_some_and(|attr| attr.value.as_ref() == b"true");
                    }
                    _ => {}
                }
                stack.push(e.name().as_ref().to_vec());
                text.clear();
            }
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::End(_) => {
                let value = std::mem::take(&mut text);

                if at(&stack, &["Blob", "Name"]) {
                    let name = decode_name(value, name_encoded)?;
                    if let Some(blob) = blob.as_mut() {
                        blob.name = name;
                    }
                } else if at(&stack, &["Blob", "Properties", "Content-Length"]) {
                    let length = value.trim().parse::<u64>().map_err(|_| Error::InvalidField {
                        field: "Content-Length",
                        value: value.clone(),
                    })?;
                    if let Some(blob) = blob.as_mut() {
                        blob.content_length = Some(length);
                    }
                } else if at(&stack, &["Blob", "Properties", "Last-Modified"]) {
                    let modified = parse_last_modified(&value)?;
                    if let Some(blob) = blob.as_mut() {
                        blob.last_modified = Some(modified);
                    }
                } else if at(&stack, &["BlobPrefix", "Name"]) {
                    records.push(BlobRecord::Prefix(decode_name(value, name_encoded)?));
                } else if at(&stack, &["Blobs", "Blob"]) {
                    if let Some(blob) = blob.take() {
                        records.push(BlobRecord::Blob(blob));
                    }
                } else if at(&stack, &["EnumerationResults", "NextMarker"]) && !value.is_empty()
                {
                    next_marker = Some(ContinuationToken::new(value));
                }

                stack.pop();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(Segment::new(records, next_marker))
}

/// Percent-decodes a `<Name Encoded="true">` value.
///
/// The service encodes names that contain characters XML cannot carry.
fn decode_name(value: String, encoded: bool) -> Result<String> {
    if !encoded {
        return Ok(value);
    }

    urlencoding::decode(&value)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| Error::InvalidField {
            field: "Name",
            value,
        })
}

/// Parses an RFC 1123 `Last-Modified` value.
fn parse_last_modified(value: &str) -> Result<Timestamp> {
    RFC1123
        .parse_timestamp(value.trim())
        .map_err(|_| Error::InvalidField {
            field: "Last-Modified",
            value: value.to_owned(),
        })
}

/// Extracts `<Code>` and the first line of `<Message>` from an error body.
///
/// Bodies that are not XML yield `(None, None)`.
pub(crate) fn parse_error_body(xml: &str) -> (Option<String>, Option<String>) {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut text = String::new();
    let mut code = None;
    let mut message = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                stack.push(e.name().as_ref().to_vec());
                text.clear();
            }
            Ok(Event::Text(e)) => match e.unescape() {
                Ok(unescaped) => text.push_str(&unescaped),
                Err(_) => break,
            },
            Ok(Event::End(_)) => {
                let value = std::mem::take(&mut text);
                if at(&stack, &["Error", "Code"]) {
                    code = Some(value.trim().to_owned()).filter(|c| !c.is_empty());
                } else if at(&stack, &["Error", "Message"]) {
                    message = value
                        .lines()
                        .next()
                        .map(|line| line.trim().to_owned())
                        .filter(|line| !line.is_empty());
                }
                stack.pop();
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    (code, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROUPED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<EnumerationResults ServiceEndpoint="https://acct.blob.core.windows.net/" ContainerName="docs">
  <Prefix>a/b/</Prefix>
  <MaxResults>2</MaxResults>
  <Delimiter>/</Delimiter>
  <Blobs>
    <Blob>
      <Name>a/b/c.txt</Name>
      <Properties>
        <Creation-Time>Tue, 30 Apr 2024 08:00:00 GMT</Creation-Time>
        <Last-Modified>Wed, 01 May 2024 12:00:00 GMT</Last-Modified>
        <Etag>0x8DC69D2F6A1B2C3</Etag>
        <Content-Length>42</Content-Length>
        <Content-Type>text/plain</Content-Type>
      </Properties>
      <OrMetadata />
    </Blob>
    <BlobPrefix>
      <Name>a/b/d/</Name>
    </BlobPrefix>
  </Blobs>
  <NextMarker>2!96!MDAwMDE1IWEvYi9lLnR4dCEwMDAwMjgh</NextMarker>
</EnumerationResults>"#;

    #[test]
    fn parses_blobs_and_prefixes_in_document_order() {
        let segment = parse_enumeration(GROUPED).unwrap();
        assert_eq!(segment.records.len(), 2);

        let BlobRecord::Blob(blob) = &segment.records[0] else {
            panic!("expected a blob, got {:?}", segment.records[0]);
        };
        assert_eq!(blob.name, "a/b/c.txt");
        assert_eq!(blob.content_length, Some(42));
        assert_eq!(
            blob.last_modified,
            Some("2024-05-01T12:00:00Z".parse().unwrap())
        );

        assert_eq!(segment.records[1], BlobRecord::Prefix("a/b/d/".into()));
        assert_eq!(
            segment.next_marker.as_ref().map(ContinuationToken::as_str),
            Some("2!96!MDAwMDE1IWEvYi9lLnR4dCEwMDAwMjgh")
        );
    }

    #[test]
    fn empty_next_marker_means_exhausted() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<EnumerationResults ContainerName="docs"><Blobs /><NextMarker /></EnumerationResults>"#;
        let segment = parse_enumeration(xml).unwrap();
        assert!(segment.records.is_empty());
        assert!(segment.next_marker.is_none());

        let xml = "<EnumerationResults><Blobs></Blobs><NextMarker></NextMarker></EnumerationResults>";
        assert!(parse_enumeration(xml).unwrap().next_marker.is_none());
    }

    #[test]
    fn unescapes_entities_and_keeps_whitespace_in_names() {
        let xml = "<EnumerationResults><Blobs>\
            <Blob><Name> R&amp;D &lt;draft&gt;.txt</Name><Properties /></Blob>\
            </Blobs><NextMarker/></EnumerationResults>";
        let segment = parse_enumeration(xml).unwrap();
        assert_eq!(segment.records[0].name(), " R&D <draft>.txt");
    }

    #[test]
    fn decodes_encoded_names() {
        let xml = "<EnumerationResults><Blobs>\
            <Blob><Name Encoded=\"true\">logs/bell%07.txt</Name><Properties /></Blob>\
            <BlobPrefix><Name Encoded=\"true\">tab%09dir/</Name></BlobPrefix>\
            <Blob><Name Encoded=\"false\">plain%20name</Name><Properties /></Blob>\
            </Blobs><NextMarker/></EnumerationResults>";
        let segment = parse_enumeration(xml).unwrap();

        assert_eq!(segment.records[0].name(), "logs/bell\u{7}.txt");
        assert_eq!(segment.records[1], BlobRecord::Prefix("tab\tdir/".into()));
        assert_eq!(segment.records[2].name(), "plain%20name");
    }

    #[test]
    fn undecodable_encoded_name_is_an_error() {
        let xml = "<EnumerationResults><Blobs>\
            <Blob><Name Encoded=\"true\">bad%FF</Name><Properties /></Blob>\
            </Blobs></EnumerationResults>";
        assert!(matches!(
            parse_enumeration(xml),
            Err(Error::InvalidField { field: "Name", .. })
        ));
    }

    #[test]
    fn prefix_element_outside_blobs_is_ignored() {
        let xml = "<EnumerationResults><Prefix>x/</Prefix><Marker>m</Marker><Blobs/>\
            <NextMarker/></EnumerationResults>";
        let segment = parse_enumeration(xml).unwrap();
        assert!(segment.records.is_empty());
    }

    #[test]
    fn malformed_fields_are_errors() {
        let xml = "<EnumerationResults><Blobs><Blob><Name>a</Name>\
            <Properties><Content-Length>many</Content-Length></Properties>\
            </Blob></Blobs></EnumerationResults>";
        assert!(matches!(
            parse_enumeration(xml),
            Err(Error::InvalidField { field: "Content-Length", .. })
        ));

        let xml = "<EnumerationResults><Blobs><Blob><Name>a</Name>\
            <Properties><Last-Modified>yesterday</Last-Modified></Properties>\
            </Blob></Blobs></EnumerationResults>";
        assert!(matches!(
            parse_enumeration(xml),
            Err(Error::InvalidField { field: "Last-Modified", .. })
        ));
    }

    #[test]
    fn mismatched_tags_are_xml_errors() {
        let xml = "<EnumerationResults><Blobs></Blob></EnumerationResults>";
        assert!(matches!(parse_enumeration(xml), Err(Error::Xml(_))));
    }

    #[test]
    fn error_body_code_and_first_message_line() {
        let body = "<?xml version=\"1.0\" encoding=\"utf-8\"?><Error>\
            <Code>AuthenticationFailed</Code>\
            <Message>Server failed to authenticate the request.\nRequestId:abc\nTime:2024-05-01T12:00:00Z</Message>\
            </Error>";
        let (code, message) = parse_error_body(body);
        assert_eq!(code.as_deref(), Some("AuthenticationFailed"));
        assert_eq!(
            message.as_deref(),
            Some("Server failed to authenticate the request.")
        );
    }

    #[test]
    fn error_body_that_is_not_xml() {
        assert_eq!(parse_error_body(""), (None, None));
        assert_eq!(parse_error_body("Service Unavailable"), (None, None));
    }
}
