use std::collections::HashMap;

use lopdf::{Document, Object, ObjectId};

/// Deep-copies page objects from one document into another, remapping every
/// object reference so the imported graph gets fresh IDs in the target.
struct PageImporter<'a> {
    source: &'a Document,
    target: &'a mut Document,
    id_map: HashMap<ObjectId, ObjectId>,
}

impl<'a> PageImporter<'a> {
    fn new(source: &'a Document, target: &'a mut Document) -> Self {
        PageImporter {
            source,
            target,
            id_map: HashMap::new(),
        }
    }

    fn import(&mut self, source_id: ObjectId) -> Result<ObjectId, lopdf::Error> {
        if let Some(target_id) = self.id_map.get(&source_id) {
            return Ok(*target_id);
        }

        // Map the ID before recursing. Page graphs are cyclic
        // (Page -> Parent -> Kids -> Page), so the placeholder breaks the
        // cycle; it is replaced with the real object below.
        let new_id = self.target.add_object(Object::Null);
        self.id_map.insert(source_id, new_id);

        let obj = self.source.get_object(source_id)?.clone();
        let new_obj = self.remap(obj)?;

        match self.target.objects.get_mut(&new_id) {
            Some(slot) => *slot = new_obj,
            None => return Err(lopdf::Error::ObjectNotFound(new_id)),
        }

        Ok(new_id)
    }

    fn remap(&mut self, obj: Object) -> Result<Object, lopdf::Error> {
        match obj {
            Object::Reference(id) => Ok(Object::Reference(self.import(id)?)),
            Object::Array(arr) => {
                let remapped = arr
                    .into_iter()
                    .map(|o| self.remap(o))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Object::Array(remapped))
            }
            Object::Dictionary(mut dict) => {
                for (_, value) in dict.iter_mut() {
                    *value = self.remap(value.clone())?;
                }
                Ok(Object::Dictionary(dict))
            }
            Object::Stream(mut stream) => {
                for (_, value) in stream.dict.iter_mut() {
                    *value = self.remap(value.clone())?;
                }
                Ok(Object::Stream(stream))
            }
            other => Ok(other),
        }
    }
}

/// Append all pages of `source` to the end of `target`'s page tree.
///
/// Returns the new page IDs in reading order. Each imported page carries its
/// own resources and content streams, copied via [`PageImporter`].
pub(super) fn append_pages(
    target: &mut Document,
    source: &Document,
) -> Result<Vec<ObjectId>, lopdf::Error> {
    // BTreeMap keys are 1-based page numbers, so iteration is reading order.
    let source_pages = source.get_pages();
    if source_pages.is_empty() {
        return Ok(Vec::new());
    }

    let mut importer = PageImporter::new(source, target);
    let mut new_ids = Vec::with_capacity(source_pages.len());
    for (_, page_id) in source_pages {
        new_ids.push(importer.import(page_id)?);
    }

    let root_id = target.trailer.get(b"Root")?.as_reference()?;
    let pages_id = target
        .get_object(root_id)?
        .as_dict()?
        .get(b"Pages")?
        .as_reference()?;

    let pages_dict = target.get_object_mut(pages_id)?.as_dict_mut()?;
    let mut kids = pages_dict.get(b"Kids")?.as_array()?.clone();
    let count = pages_dict.get(b"Count")?.as_i64()?;
    kids.extend(new_ids.iter().map(|id| Object::Reference(*id)));
    pages_dict.set("Kids", Object::Array(kids));
    pages_dict.set("Count", count + new_ids.len() as i64);

    for id in &new_ids {
        if let Ok(Object::Dictionary(page)) = target.get_object_mut(*id) {
            page.set("Parent", Object::Reference(pages_id));
        }
    }

    Ok(new_ids)
}
