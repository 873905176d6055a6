/// A unique-element container that preserves first-insertion order.
/// Duplicate inserts are silently absorbed. Element counts are small
/// (FQDNs, URIs, protocol numbers), so membership is a linear scan.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrderedSet<T: PartialEq> {
    items: Vec<T>,
}

pub type OrderedStringSet = OrderedSet<String>;
pub type OrderedIntSet = OrderedSet<i32>;

impl<T: PartialEq> OrderedSet<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn insert(&mut self, value: T) {
        if !self.items.contains(&value) {
            self.items.push(value);
        }
    }

    pub fn extend(&mut self, values: impl IntoIterator<Item = T>) {
        for value in values {
            self.insert(value);
        }
    }

    pub fn contains(&self, value: &T) -> bool {
        self.items.contains(value)
    }

    pub fn remove(&mut self, value: &T) {
        self.items.retain(|item| item != value);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: PartialEq> FromIterator<T> for OrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<'a, T: PartialEq> IntoIterator for &'a OrderedSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::OrderedSet;

    #[test]
    fn preserves_first_insertion_order() {
        let mut set = OrderedSet::new();
        set.insert("b".to_string());
        set.insert("a".to_string());
        set.insert("c".to_string());
        let order: Vec<&str> = set.iter().map(String::as_str).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn absorbs_duplicates() {
        let set: OrderedSet<i32> = [6, 17, 6, 6, 17].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&6));
        assert!(set.contains(&17));
    }

    #[test]
    fn remove_drops_the_element() {
        let mut set: OrderedSet<i32> = [1, 2, 3].into_iter().collect();
        set.remove(&2);
        assert_eq!(set.len(), 2);
        assert!(!set.contains(&2));
    }
}
