use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};

use crate::money::{self, cents};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub price_cents: i64,
    pub popular: bool,
}

impl MenuItem {
    pub fn price(&self) -> BigDecimal {
        cents(self.price_cents)
    }
}

const fn item(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    category: &'static str,
    price_cents: i64,
    popular: bool,
) -> MenuItem {
    MenuItem {
        id,
        name,
        description,
        category,
        price_cents,
        popular,
    }
}

pub const CATEGORIES: [&str; 4] = ["hot-drinks", "cold-drinks", "snacks", "meals"];

pub const MENU: [MenuItem; 24] = [
    item("hd1", "Espresso", "Rich and bold espresso shot", "hot-drinks", 150, true),
    item("hd2", "Cappuccino", "Classic cappuccino with foam", "hot-drinks", 200, true),
    item("hd3", "Latte", "Smooth latte with steamed milk", "hot-drinks", 250, false),
    item("hd4", "Turkish Coffee", "Traditional Turkish coffee", "hot-drinks", 175, true),
    item("hd5", "Hot Chocolate", "Rich hot chocolate", "hot-drinks", 225, false),
    item("hd6", "Green Tea", "Fresh green tea", "hot-drinks", 125, false),
    item("cd1", "Iced Latte", "Refreshing iced latte", "cold-drinks", 275, true),
    item("cd2", "Iced Americano", "Cold americano coffee", "cold-drinks", 225, false),
    item("cd3", "Fresh Orange Juice", "Freshly squeezed orange juice", "cold-drinks", 300, true),
    item("cd4", "Smoothie", "Mixed fruit smoothie", "cold-drinks", 350, false),
    item("cd5", "Soft Drink", "Assorted soft drinks", "cold-drinks", 100, false),
    item("cd6", "Bottled Water", "Fresh bottled water", "cold-drinks", 50, false),
    item("sn1", "Croissant", "Buttery croissant", "snacks", 150, true),
    item("sn2", "Chocolate Chip Cookie", "Homemade cookie", "snacks", 100, false),
    item("sn3", "Brownie", "Rich chocolate brownie", "snacks", 200, false),
    item("sn4", "Muffin", "Blueberry or chocolate muffin", "snacks", 175, false),
    item("sn5", "Chips", "Assorted chips", "snacks", 75, false),
    item("sn6", "Energy Bar", "Nutritious energy bar", "snacks", 200, false),
    item("m1", "Club Sandwich", "Triple-decker sandwich with fries", "meals", 450, true),
    item("m2", "Caesar Salad", "Fresh Caesar salad with chicken", "meals", 375, false),
    item("m3", "Pasta", "Creamy pasta with choice of sauce", "meals", 500, true),
    item("m4", "Pizza Slice", "Fresh pizza slice", "meals", 250, false),
    item("m5", "Burger", "Beef burger with fries", "meals", 550, false),
    item("m6", "Wrap", "Chicken or vegetable wrap", "meals", 400, false),
];

pub fn find(id: &str) -> Option<&'static MenuItem> {
    MENU.iter().find(|item| item.id == id)
}

pub fn by_category(category: &str) -> impl Iterator<Item = &'static MenuItem> + '_ {
    MENU.iter().filter(move |item| category == "all" || item.category == category)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub item_id: String,
    pub quantity: u32,
}

/// Σ price × quantity, unknown items add nothing.
pub fn cart_total(lines: &[CartLine]) -> BigDecimal {
    let total = lines
        .iter()
        .filter_map(|line| find(&line.item_id).map(|item| item.price() * BigDecimal::from(line.quantity)))
        .fold(BigDecimal::zero(), |acc, amount| acc + amount);
    money::round(&total)
}

/// Most of one item a single order may carry.
pub const MAX_QUANTITY: u32 = 99;

/// Cart lines keyed by menu item, one line per item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Adds `quantity` of the item, merging with an existing line. Unknown
    /// items, a zero quantity or a line above [`MAX_QUANTITY`] are refused
    /// and leave the cart as it was.
    pub fn put(&mut self, item_id: &str, quantity: u32) -> bool {
        if quantity == 0 || find(item_id).is_none() {
            return false;
        }
        match self.lines.iter_mut().find(|line| line.item_id == item_id) {
            Some(line) => match line.quantity.checked_add(quantity).filter(|q| *q <= MAX_QUANTITY) {
                Some(merged) => line.quantity = merged,
                None => return false,
            },
            None if quantity <= MAX_QUANTITY => self.lines.push(CartLine {
                item_id: item_id.to_string(),
                quantity,
            }),
            None => return false,
        }
        true
    }

    // bounded by MENU.len() × MAX_QUANTITY
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    pub fn total(&self) -> BigDecimal {
        cart_total(&self.lines)
    }
}
