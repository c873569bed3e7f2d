use crate::Value;

/// An ordered, multi-valued collection of named form fields.
///
/// Entries keep their insertion order, duplicate names are legal, and every
/// accessor observes that order. Mutations are synchronous in-memory edits;
/// none of them can fail. [`get`](FormData::get) and
/// [`get_all`](FormData::get_all) return borrows of the stored values, so
/// repeated reads of the same entry always see the same object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    entries: Vec<Entry>,
}

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    name: String,
    value: Value,
}

impl FormData {
    pub fn new() -> FormData {
        FormData::default()
    }

    /// Adds a new entry at the end of the collection. Never overwrites.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.entries.push(Entry {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Like [`append`](FormData::append), but overrides the filename when the
    /// value is an attachment. The filename is ignored for text values.
    pub fn append_with_file_name(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
        file_name: impl Into<String>,
    ) {
        self.append(name, with_file_name(value.into(), file_name.into()));
    }

    /// Replaces the first entry matching `name` in place, removes every later
    /// entry with that name, and appends instead when no entry matches.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let mut value = Some(value.into());

        self.entries.retain_mut(|entry| {
            if entry.name != name {
                return true;
            }
            match value.take() {
                Some(replacement) => {
                    entry.value = replacement;
                    true
                }
                None => false,
            }
        });

        if let Some(value) = value {
            self.entries.push(Entry { name, value });
        }
    }

    /// Like [`set`](FormData::set), but overrides the filename when the value
    /// is an attachment.
    pub fn set_with_file_name(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
        file_name: impl Into<String>,
    ) {
        self.set(name, with_file_name(value.into(), file_name.into()));
    }

    /// Removes every entry matching `name`.
    pub fn delete(&mut self, name: &str) {
        self.entries.retain(|entry| entry.name != name);
    }

    /// The value of the first entry matching `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.value)
    }

    /// All values matching `name`, in insertion order.
    pub fn get_all(&self, name: &str) -> Vec<&Value> {
        self.entries
            .iter()
            .filter(|entry| entry.name == name)
            .map(|entry| &entry.value)
            .collect()
    }

    pub fn has(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over all `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> Iter<'_> {
        Iter(self.entries.iter())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|entry| &entry.value)
    }
}

fn with_file_name(mut value: Value, file_name: String) -> Value {
    if let Value::Attachment(attachment) = &mut value {
        attachment.set_file_name(file_name);
    }
    value
}

/// Iterator over the `(name, value)` pairs of a [`FormData`].
pub struct Iter<'a>(std::slice::Iter<'a, Entry>);

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|entry| (entry.name.as_str(), &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a> IntoIterator for &'a FormData {
    type Item = (&'a str, &'a Value);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
