/// Standard reference drag curves.
///
/// A bullet's ballistic coefficient is defined against one of these; G1
/// suits flat-based bullets, G7 suits boat-tail match bullets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragModel {
    G1,
    G7,
}

impl DragModel {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "G1" => Some(DragModel::G1),
            "G7" => Some(DragModel::G7),
            _ => None,
        }
    }
}

impl std::fmt::Display for DragModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
