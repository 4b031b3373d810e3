/// User registered expression and its last evaluated value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchVariable {
    pub expression: String,
    pub value: Option<String>,
}

/// Ordered list of watch expressions. Order is the display order, evaluation never
/// reorders entries.
#[derive(Debug, Default, Clone)]
pub struct WatchList {
    items: Vec<WatchVariable>,
}

impl WatchList {
    pub fn add(&mut self, expression: impl Into<String>) {
        self.items.push(WatchVariable {
            expression: expression.into(),
            value: None,
        });
    }

    /// Remove expression at `index`, return it if exists.
    pub fn remove(&mut self, index: usize) -> Option<WatchVariable> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn expression(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(|w| w.expression.as_str())
    }

    /// Overwrite the value of the entry at `index` in place.
    pub fn set_value(&mut self, index: usize, value: String) {
        if let Some(w) = self.items.get_mut(index) {
            w.value = Some(value);
        }
    }

    pub fn snapshot(&self) -> Vec<WatchVariable> {
        self.items.clone()
    }
}
