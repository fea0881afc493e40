/// One numeric stat on an owner.
///
/// `base` is the authored value, `current` the derived one. A refresh
/// resets `current` to `base` and lets the modifier handlers re-apply
/// their aggregates on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    pub id: i32,
    pub base: i32,
    pub current: i32,
}

impl Stat {
    pub fn new(id: i32, base: i32) -> Self {
        Self {
            id,
            base,
            current: base,
        }
    }
}
