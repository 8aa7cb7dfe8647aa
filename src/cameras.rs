use std::collections::HashSet;

use crate::chunk::{Chunk, ChunkParser};
use crate::class::ClassEntry;
use crate::dll::decode_utf16le;
use crate::error::MaxDumpError;
use crate::linker::{annotate_scene, SceneEntry};

const IDN_NODE_REFS: u16 = 0x2035;
const IDN_OBJECT_NAME: u16 = 0x962;
const CAMERA_SUPER_CLASS_ID: u32 = 0x20;

/* Enumerates scene Node objects whose reference array points at a
 * camera-class object, and returns the referencing Node's own name.
 * A Node missing its 0x2035 reference child legitimately has no
 * references and is skipped; a Node missing its 0x962 name child is a
 * malformed scene and is fatal.
 */
pub struct CameraQuery;

impl CameraQuery {
    pub fn list_camera_names(
        scene_stream: &[u8],
        classes: &[ClassEntry],
    ) -> Result<Vec<String>, MaxDumpError> {
        let camera_class_indices: HashSet<u16> = classes
            .iter()
            .enumerate()
            .filter(|(_, c)| c.super_class_id == CAMERA_SUPER_CLASS_ID)
            .map(|(i, _)| i as u16)
            .collect();

        let node_class_index = classes
            .iter()
            .position(|c| c.name == "Node")
            .ok_or(MaxDumpError::NoNodeClass)? as u16;

        let top_level = ChunkParser::parse(scene_stream)?;
        let objects = top_level
            .first()
            .and_then(|chunk| chunk.children())
            .unwrap_or(&[]);

        let scene_entries = annotate_scene(objects, classes)?;

        let camera_self_indices: HashSet<usize> = scene_entries
            .iter()
            .filter(|entry| camera_class_indices.contains(&entry.class_index))
            .map(|entry| entry.self_index)
            .collect();

        let mut names = Vec::new();

        for entry in scene_entries.iter().filter(|e| e.class_index == node_class_index) {
            let refs = match node_refs(entry)? {
                Some(refs) => refs,
                None => continue,
            };

            if refs.iter().any(|r| camera_self_indices.contains(&(*r as usize))) {
                names.push(node_name(entry)?);
            }
        }

        return Ok(names);
    }
}

fn node_refs(entry: &SceneEntry) -> Result<Option<Vec<i32>>, MaxDumpError> {
    let child = match find_child(&entry.children, IDN_NODE_REFS) {
        Some(c) => c,
        None => {
            log::debug!(
                "node at scene index {} has no 0x2035 reference array, skipping",
                entry.self_index
            );
            return Ok(None);
        }
    };

    let bytes = child.as_value().ok_or_else(|| {
        MaxDumpError::MalformedChunk("0x2035 reference array must be a value chunk".to_string())
    })?;

    if bytes.len() % 4 != 0 {
        return Err(MaxDumpError::MalformedChunk(format!(
            "0x2035 reference array length {} is not a multiple of 4",
            bytes.len()
        )));
    }

    let refs = bytes
        .chunks_exact(4)
        .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    return Ok(Some(refs));
}

fn node_name(entry: &SceneEntry) -> Result<String, MaxDumpError> {
    let child = find_child(&entry.children, IDN_OBJECT_NAME).ok_or(MaxDumpError::NodeMissingName)?;

    let bytes = child.as_value().ok_or(MaxDumpError::NodeMissingName)?;

    return decode_utf16le(bytes).map_err(|_| MaxDumpError::NodeMissingName);
}

fn find_child(children: &[Chunk], idn: u16) -> Option<&Chunk> {
    return children.iter().find(|c| c.idn() == idn);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkHeader;
    use crate::chunk::ChunkKind;

    fn value(idn: u16, bytes: Vec<u8>) -> Chunk {
        Chunk::Value {
            header: ChunkHeader {
                idn,
                value_length: bytes.len(),
                kind: ChunkKind::Value,
                extended: false,
            },
            bytes,
        }
    }

    fn container(idn: u16, children: Vec<Chunk>) -> Chunk {
        Chunk::Container {
            header: ChunkHeader {
                idn,
                value_length: 0,
                kind: ChunkKind::Container,
                extended: false,
            },
            children,
        }
    }

    fn utf16le_bytes(s: &str) -> Vec<u8> {
        s.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
    }

    fn class(name: &str, super_class_id: u32) -> ClassEntry {
        ClassEntry {
            name: name.to_string(),
            dll_index: -1,
            class_id: (0, 0),
            super_class_id,
        }
    }

    #[test]
    fn finds_node_referencing_a_camera() {
        // class 0 = Camera (super class 0x20), class 1 = Node
        let classes = vec![class("FreeCamera", 0x20), class("Node", 0)];

        let camera_obj = container(0, vec![]);
        let refs_bytes: Vec<u8> = 0i32.to_le_bytes().to_vec();
        let node_obj = container(
            1,
            vec![
                value(IDN_NODE_REFS, refs_bytes),
                value(IDN_OBJECT_NAME, utf16le_bytes("Camera01")),
            ],
        );

        let scene_container = container(0xffff, vec![camera_obj, node_obj]);
        let mut scene_bytes = Vec::new();
        encode_container(&scene_container, &mut scene_bytes);

        let names = CameraQuery::list_camera_names(&scene_bytes, &classes).unwrap();
        assert_eq!(names, vec!["Camera01".to_string()]);
    }

    #[test]
    fn node_without_refs_is_skipped_not_fatal() {
        let classes = vec![class("FreeCamera", 0x20), class("Node", 0)];

        let node_obj = container(1, vec![value(IDN_OBJECT_NAME, utf16le_bytes("Lonely"))]);
        let scene_container = container(0xffff, vec![node_obj]);
        let mut scene_bytes = Vec::new();
        encode_container(&scene_container, &mut scene_bytes);

        let names = CameraQuery::list_camera_names(&scene_bytes, &classes).unwrap();
        assert!(names.is_empty());
    }

    #[test]
    fn missing_node_class_is_fatal() {
        let classes = vec![class("FreeCamera", 0x20)];
        let scene_container = container(0xffff, vec![]);
        let mut scene_bytes = Vec::new();
        encode_container(&scene_container, &mut scene_bytes);

        let err = CameraQuery::list_camera_names(&scene_bytes, &classes).unwrap_err();
        assert!(matches!(err, MaxDumpError::NoNodeClass));
    }

    // Minimal short-header container encoder, test-only, mirroring the
    // wire format in chunk.rs in reverse.
    fn encode_container(chunk: &Chunk, out: &mut Vec<u8>) {
        match chunk {
            Chunk::Container { header, children } => {
                let mut body = Vec::new();
                for child in children {
                    encode_chunk(child, &mut body);
                }
                let total_len = 6 + body.len();
                out.extend(header.idn.to_le_bytes());
                out.extend(((total_len as u32) | 0x8000_0000).to_le_bytes());
                out.extend(body);
            }
            Chunk::Value { .. } => encode_chunk(chunk, out),
        }
    }

    fn encode_chunk(chunk: &Chunk, out: &mut Vec<u8>) {
        match chunk {
            Chunk::Value { header, bytes } => {
                out.extend(header.idn.to_le_bytes());
                out.extend(((6 + bytes.len()) as u32).to_le_bytes());
                out.extend(bytes);
            }
            Chunk::Container { .. } => encode_container(chunk, out),
        }
    }
}
