use super::PduPart;

/// Ordered, mutable list of body parts.
///
/// Index access is bounds checked: an out-of-range read, insert or removal
/// returns `None`/`false` and leaves the list untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PduBody {
    parts: Vec<PduPart>,
}

impl PduBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_part(&mut self, part: PduPart) {
        self.parts.push(part);
    }

    /// Insert at `index`, shifting later parts. `index == len()` appends.
    pub fn add_part_at(&mut self, index: usize, part: PduPart) -> bool {
        if index > self.parts.len() {
            return false;
        }
        self.parts.insert(index, part);
        true
    }

    pub fn part(&self, index: usize) -> Option<&PduPart> {
        self.parts.get(index)
    }

    pub fn remove_part(&mut self, index: usize) -> Option<PduPart> {
        if index < self.parts.len() {
            Some(self.parts.remove(index))
        } else {
            None
        }
    }

    pub fn part_by_content_id(&self, content_id: &str) -> Option<&PduPart> {
        self.parts
            .iter()
            .find(|p| p.content_id.as_deref() == Some(content_id))
    }

    pub fn part_by_content_location(&self, location: &str) -> Option<&PduPart> {
        self.parts
            .iter()
            .find(|p| p.content_location.as_deref() == Some(location))
    }

    pub fn part_by_filename(&self, filename: &str) -> Option<&PduPart> {
        self.parts
            .iter()
            .find(|p| p.filename.as_deref() == Some(filename))
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn clear(&mut self) {
        self.parts.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PduPart> {
        self.parts.iter()
    }
}

impl FromIterator<PduPart> for PduBody {
    fn from_iter<I: IntoIterator<Item = PduPart>>(iter: I) -> Self {
        Self {
            parts: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PduBody {
    type Item = &'a PduPart;
    type IntoIter = std::slice::Iter<'a, PduPart>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.iter()
    }
}
