/// Case-insensitive substring blocklist.
///
/// Matching is deliberately naive: "class" is caught by a ban on "ass".
#[derive(Debug, Clone, Default)]
pub struct ContentFilter {
    banned: Vec<String>,
}

impl ContentFilter {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let banned = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { banned }
    }

    pub fn contains_banned(&self, text: &str) -> bool {
        if self.banned.is_empty() {
            return false;
        }
        let lower = text.to_lowercase();
        self.banned.iter().any(|word| lower.contains(word.as_str()))
    }

    pub fn len(&self) -> usize {
        self.banned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.banned.is_empty()
    }
}
