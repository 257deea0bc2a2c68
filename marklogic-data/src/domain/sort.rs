use std::fmt::{Display, Formatter};

/// Specifies the direction for sorting search results.
///
/// # Variants
/// - `Ascending`: Sort from smallest to largest value (A to Z, 0 to 9)
/// - `Descending`: Sort from largest to smallest value (Z to A, 9 to 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn is_ascending(&self) -> bool {
        matches!(self, SortOrder::Ascending)
    }

    pub fn reverse(&self) -> SortOrder {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }
}

/// One sort key: a property path and its direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Order {
    property: String,
    direction: SortOrder,
}

impl Order {
    pub fn new(property: &str, direction: SortOrder) -> Self {
        Order {
            property: property.to_string(),
            direction,
        }
    }

    pub fn asc(property: &str) -> Self {
        Order::new(property, SortOrder::Ascending)
    }

    pub fn desc(property: &str) -> Self {
        Order::new(property, SortOrder::Descending)
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn direction(&self) -> SortOrder {
        self.direction
    }
}

impl Display for Order {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let direction = if self.direction.is_ascending() { "ASC" } else { "DESC" };
        write!(f, "{}: {}", self.property, direction)
    }
}

/// An ordered list of sort keys. An empty list means "unsorted", in which
/// case the store returns matches in its own order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Sort {
    orders: Vec<Order>,
}

impl Sort {
    pub fn unsorted() -> Self {
        Sort { orders: Vec::new() }
    }

    pub fn by(orders: Vec<Order>) -> Self {
        Sort { orders }
    }

    /// Sorts ascending by each of the given properties, in order.
    pub fn by_properties(properties: &[&str]) -> Self {
        Sort {
            orders: properties.iter().map(|p| Order::asc(p)).collect(),
        }
    }

    /// Appends the keys of `other` after the keys of this sort.
    pub fn and(mut self, other: Sort) -> Self {
        self.orders.extend(other.orders);
        self
    }

    pub fn is_sorted(&self) -> bool {
        !self.orders.is_empty()
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn order_for(&self, property: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.property == property)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Order> {
        self.orders.iter()
    }
}

impl Display for Sort {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.orders.is_empty() {
            return write!(f, "UNSORTED");
        }
        let keys: Vec<String> = self.orders.iter().map(|o| o.to_string()).collect();
        write!(f, "{}", keys.join(", "))
    }
}

impl<'a> IntoIterator for &'a Sort {
    type Item = &'a Order;
    type IntoIter = std::slice::Iter<'a, Order>;

    fn into_iter(self) -> Self::IntoIter {
        self.orders.iter()
    }
}
