use crate::analyzer::Type;

#[derive(Clone, Debug, PartialEq)]
pub struct GlobalVar {
    pub name: String,
    pub ty: Type,
    /// Set once the storage for this global has been written out.
    pub emitted: bool,
}

/// Globals stay visible for the whole compilation, in declaration order.
#[derive(Debug, Default)]
pub struct GlobalVariables {
    globals: Vec<GlobalVar>,
}

impl GlobalVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, name: &str, ty: Type) -> Option<usize> {
        if self.find(name).is_some() {
            return None;
        }

        self.globals.push(GlobalVar {
            name: name.to_string(),
            ty,
            emitted: false,
        });
        Some(self.globals.len() - 1)
    }

    pub fn find(&self, name: &str) -> Option<&GlobalVar> {
        self.globals.iter().rev().find(|g| g.name == name)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut GlobalVar> {
        self.globals.iter_mut()
    }
}
