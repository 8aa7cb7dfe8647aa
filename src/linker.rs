use crate::chunk::Chunk;
use crate::class::{ClassEntry, DLL_INDEX_BUILTIN, DLL_INDEX_SCRIPT};
use crate::dll::DllEntry;
use crate::error::MaxDumpError;

#[derive(Clone, Debug)]
pub struct LinkedClassEntry {
    pub name: String,
    pub dll_index: i32,
    pub class_id: (u32, u32),
    pub super_class_id: u32,
    pub dll_name: String,
    pub dll_description: String,
}

/* A top-level Scene stream object after its class has been resolved.
 * `class_index` is the raw chunk idn (the position of the governing
 * entry in ClassDirectory3); `self_index` is this object's own position
 * among its Scene siblings, used to resolve Node reference arrays.
 */
#[derive(Clone, Debug)]
pub struct SceneEntry {
    pub class_index: u16,
    pub class_name: String,
    pub self_index: usize,
    pub children: Vec<Chunk>,
}

pub fn link_classes_to_dlls(
    classes: &[ClassEntry],
    dlls: &[DllEntry],
) -> Result<Vec<LinkedClassEntry>, MaxDumpError> {
    let mut linked = Vec::with_capacity(classes.len());

    for class in classes {
        let (dll_name, dll_description) = match class.dll_index {
            DLL_INDEX_BUILTIN => ("builtin".to_string(), "Built-in type".to_string()),
            DLL_INDEX_SCRIPT => ("script".to_string(), "Scripted class".to_string()),
            i if i >= 0 && (i as usize) < dlls.len() => {
                let dll = &dlls[i as usize];
                (dll.name.clone(), dll.description.clone())
            }
            i => return Err(MaxDumpError::InvalidDllIndex(i)),
        };

        linked.push(LinkedClassEntry {
            name: class.name.clone(),
            dll_index: class.dll_index,
            class_id: class.class_id,
            super_class_id: class.super_class_id,
            dll_name,
            dll_description,
        });
    }

    return Ok(linked);
}

/* `scene_objects` must be the children of the single top-level Scene
 * container (i.e. `ChunkParser::parse(scene_bytes)[0].children()`).
 */
pub fn annotate_scene(
    scene_objects: &[Chunk],
    classes: &[ClassEntry],
) -> Result<Vec<SceneEntry>, MaxDumpError> {
    let mut entries = Vec::with_capacity(scene_objects.len());

    for (self_index, object) in scene_objects.iter().enumerate() {
        let class_index = object.idn();
        let class = classes
            .get(class_index as usize)
            .ok_or(MaxDumpError::UnknownClassIndex(class_index))?;

        let children = object.children().unwrap_or(&[]).to_vec();

        entries.push(SceneEntry {
            class_index,
            class_name: class.name.clone(),
            self_index,
            children,
        });
    }

    return Ok(entries);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(name: &str, dll_index: i32) -> ClassEntry {
        ClassEntry {
            name: name.to_string(),
            dll_index,
            class_id: (0, 0),
            super_class_id: 0,
        }
    }

    #[test]
    fn builtin_and_script_resolve_without_dlls() {
        let classes = vec![class("A", DLL_INDEX_BUILTIN), class("B", DLL_INDEX_SCRIPT)];
        let linked = link_classes_to_dlls(&classes, &[]).unwrap();

        assert_eq!(linked[0].dll_name, "builtin");
        assert_eq!(linked[0].dll_description, "Built-in type");
        assert_eq!(linked[1].dll_name, "script");
        assert_eq!(linked[1].dll_description, "Scripted class");
    }

    #[test]
    fn dll_index_resolves_into_dll_list() {
        let classes = vec![class("A", 0)];
        let dlls = vec![DllEntry {
            name: "custattribcontainer.dlo".to_string(),
            description: "Custom Attribute Container (Autodesk)".to_string(),
        }];

        let linked = link_classes_to_dlls(&classes, &dlls).unwrap();
        assert_eq!(linked[0].dll_name, "custattribcontainer.dlo");
        assert_eq!(linked[0].dll_description, "Custom Attribute Container (Autodesk)");
    }

    #[test]
    fn out_of_range_dll_index_is_fatal() {
        let classes = vec![class("A", 3)];
        let err = link_classes_to_dlls(&classes, &[]).unwrap_err();
        assert!(matches!(err, MaxDumpError::InvalidDllIndex(3)));
    }
}
