use json::JsonValue;

use crate::chunk::Chunk;
use crate::class::LinkedClassEntry;
use crate::dll::DllDirectory;
use crate::linker::SceneEntry;

/* Renders decoded results as JSON at the output boundary. The core keeps
 * only raw bytes and typed fields; hex/ascii/int views of a value chunk
 * are computed here, on demand, rather than memoized on the chunk tree.
 */
pub fn chunks_to_json(chunks: &[Chunk]) -> JsonValue {
    let items: Vec<JsonValue> = chunks.iter().map(chunk_to_json).collect();
    return JsonValue::Array(items);
}

fn chunk_to_json(chunk: &Chunk) -> JsonValue {
    match chunk {
        Chunk::Value { header, bytes } => {
            let mut obj = json::object! {
                idn: format!("{:#06x}", header.idn),
                kind: "value",
                extended: header.extended,
                length: bytes.len(),
                hex: hex_dump(bytes),
                ascii: bin2ascii(bytes),
            };

            if bytes.len() == 4 {
                let value = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
                obj["int"] = value.into();
            }

            return obj;
        }
        Chunk::Container { header, children } => {
            return json::object! {
                idn: format!("{:#06x}", header.idn),
                kind: "container",
                extended: header.extended,
                length: header.value_length,
                children: chunks_to_json(children),
            };
        }
    }
}

pub fn dll_directory_to_json(directory: &DllDirectory) -> JsonValue {
    let entries: Vec<JsonValue> = directory
        .entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            json::object! {
                idx: idx,
                name: entry.name.clone(),
                description: entry.description.clone(),
            }
        })
        .collect();

    return JsonValue::Array(entries);
}

pub fn linked_classes_to_json(classes: &[LinkedClassEntry]) -> JsonValue {
    let entries: Vec<JsonValue> = classes
        .iter()
        .enumerate()
        .map(|(idx, class)| {
            json::object! {
                idx: idx,
                name: class.name.clone(),
                dll_index: class.dll_index,
                class_id: vec![
                    format!("{:#010x}", class.class_id.0),
                    format!("{:#010x}", class.class_id.1),
                ],
                super_class_id: format!("{:#x}", class.super_class_id),
                dll_name: class.dll_name.clone(),
                dll_description: class.dll_description.clone(),
            }
        })
        .collect();

    return JsonValue::Array(entries);
}

pub fn scene_entries_to_json(entries: &[SceneEntry]) -> JsonValue {
    let items: Vec<JsonValue> = entries
        .iter()
        .map(|entry| {
            json::object! {
                self_index: entry.self_index,
                class_index: entry.class_index as u32,
                class_name: entry.class_name.clone(),
                children: chunks_to_json(&entry.children),
            }
        })
        .collect();

    return JsonValue::Array(items);
}

pub fn properties_to_json(properties: &[(String, Vec<String>)]) -> JsonValue {
    let mut obj = JsonValue::new_object();

    for (header, items) in properties {
        let values: Vec<JsonValue> = items.iter().map(|s| JsonValue::String(s.clone())).collect();
        obj[header.as_str()] = JsonValue::Array(values);
    }

    return obj;
}

pub fn camera_names_to_json(names: &[String]) -> JsonValue {
    let values: Vec<JsonValue> = names.iter().map(|s| JsonValue::String(s.clone())).collect();
    return JsonValue::Array(values);
}

pub fn hex_dump(bytes: &[u8]) -> String {
    return bytes.iter().map(|b| format!("{b:02x}")).collect::<Vec<_>>().join(" ");
}

fn bin2ascii(bytes: &[u8]) -> String {
    return bytes
        .iter()
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
        .collect();
}
