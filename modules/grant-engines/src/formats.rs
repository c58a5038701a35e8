use quick_xml::events::Event;
use quick_xml::Reader;

/// Converts a CSV document into one JSON object per data row, keyed by
/// header name.
pub fn csv_to_records(body: &str) -> grant_common::Result<Vec<serde_json::Value>> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(body.as_bytes());
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| grant_common::GrantError::Parsing(e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| grant_common::GrantError::Parsing(e.to_string()))?;
        let mut object = serde_json::Map::new();
        for (header, value) in headers.iter().zip(record.iter()) {
            object.insert(header.clone(), serde_json::Value::String(value.to_string()));
        }
        records.push(serde_json::Value::Object(object));
    }
    Ok(records)
}

/// Converts a flat-ish XML document into one JSON object per repeated
/// top-level child of the document root (e.g. each `<grant>` under
/// `<grants>`), with nested leaf elements as string fields.
///
/// This is a pragmatic streaming conversion, not a general XML→JSON mapper:
/// it assumes the grant feed is "rows of leaf fields", which covers the
/// government and foundation grant feeds this engine targets.
pub fn xml_to_records(body: &str) -> grant_common::Result<Vec<serde_json::Value>> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text = true;

    // Fixed two-level shape: depth 1 is the document root, depth 2 is one
    // record, depth 3 is a leaf field of that record.
    let mut records = Vec::new();
    let mut depth = 0usize;
    let mut current = serde_json::Map::new();
    let mut field_name: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| grant_common::GrantError::Parsing(e.to_string()))?
        {
            Event::Start(e) => {
                depth += 1;
                if depth == 3 {
                    field_name = Some(String::from_utf8_lossy(e.name().as_ref()).to_string());
                }
            }
            Event::Text(e) => {
                if depth == 3 {
                    if let Some(field) = &field_name {
                        let text = e.unescape().unwrap_or_default().trim().to_string();
                        if !text.is_empty() {
                            current.insert(field.clone(), serde_json::Value::String(text));
                        }
                    }
                }
            }
            Event::End(_) => {
                match depth {
                    3 => field_name = None,
                    2 => records.push(serde_json::Value::Object(std::mem::take(&mut current))),
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_csv_rows_into_objects() {
        let csv = "title,amount\nFood Security Grant,5000\nArts Access Grant,2500\n";
        let records = csv_to_records(csv).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["title"], "Food Security Grant");
        assert_eq!(records[1]["amount"], "2500");
    }

    #[test]
    fn parses_flat_xml_rows_into_objects() {
        let xml = "<grants><grant><title>Health Grant</title><amount>10000</amount></grant>\
                   <grant><title>Arts Grant</title><amount>3000</amount></grant></grants>";
        let records = xml_to_records(xml).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["title"], "Health Grant");
        assert_eq!(records[1]["amount"], "3000");
    }
}
