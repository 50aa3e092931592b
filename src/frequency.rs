use std::collections::HashMap;

/// Value counts that remember first-seen order.
///
/// Rankings sort by descending count and break ties by the order in which
/// values were first recorded.
#[derive(Debug, Clone, Default)]
pub struct FrequencyCounter {
    positions: HashMap<String, usize>,
    counts: Vec<(String, usize)>,
    total: usize,
}

impl FrequencyCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, value: &str) {
        self.total += 1;
        match self.positions.get(value) {
            Some(&position) => self.counts[position].1 += 1,
            None => {
                self.positions.insert(value.to_string(), self.counts.len());
                self.counts.push((value.to_string(), 1));
            }
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn unique(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn most_common(&self) -> Option<(&str, usize)> {
        let mut best: Option<&(String, usize)> = None;
        for entry in &self.counts {
            if best.is_none_or(|current| entry.1 > current.1) {
                best = Some(entry);
            }
        }
        best.map(|(value, count)| (value.as_str(), *count))
    }

    pub fn top(&self, limit: usize) -> Vec<(String, usize)> {
        let mut items = self.counts.clone();
        // stable: equal counts keep first-seen order
        items.sort_by(|a, b| b.1.cmp(&a.1));
        items.truncate(limit);
        items
    }
}

impl<'a> FromIterator<&'a str> for FrequencyCounter {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut counter = Self::new();
        for value in iter {
            counter.record(value);
        }
        counter
    }
}
