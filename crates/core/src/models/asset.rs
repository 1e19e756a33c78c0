use serde::{Deserialize, Serialize};

/// A tradable coin.
///
/// **Equality and hashing** are based solely on `symbol`, NOT on `name`
/// or `id`. The symbol is the unique key used by the ledger and price state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    /// Price-feed identifier, lowercase (e.g., "dogecoin")
    pub id: String,

    /// Ticker symbol, uppercased (e.g., "DOGE")
    pub symbol: String,

    /// Human-readable name (e.g., "Dogecoin")
    pub name: String,
}

impl PartialEq for Asset {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
    }
}

impl Eq for Asset {}

impl std::hash::Hash for Asset {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.symbol.hash(state);
    }
}

impl std::fmt::Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.symbol)
    }
}

impl Asset {
    pub fn new(id: impl Into<String>, symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into().to_lowercase(),
            symbol: symbol.into().to_uppercase(),
            name: name.into(),
        }
    }

    pub fn dogecoin() -> Self {
        Self::new("dogecoin", "DOGE", "Dogecoin")
    }

    pub fn cardano() -> Self {
        Self::new("cardano", "ADA", "Cardano")
    }

    pub fn vechain() -> Self {
        Self::new("vechain", "VET", "VeChain")
    }
}

/// The fixed set of coins a session can trade.
///
/// Built once at session start and never extended afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetUniverse {
    assets: Vec<Asset>,
}

impl AssetUniverse {
    /// Build a universe from an explicit list. Later duplicates of a symbol are dropped.
    pub fn new(assets: Vec<Asset>) -> Self {
        let mut unique: Vec<Asset> = Vec::with_capacity(assets.len());
        for asset in assets {
            if !unique.contains(&asset) {
                unique.push(asset);
            }
        }
        Self { assets: unique }
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.assets.iter().map(|a| a.symbol.as_str())
    }

    /// Feed identifiers in universe order, for batched price requests.
    pub fn feed_ids(&self) -> Vec<String> {
        self.assets.iter().map(|a| a.id.clone()).collect()
    }

    /// Case-insensitive lookup by ticker symbol.
    pub fn by_symbol(&self, symbol: &str) -> Option<&Asset> {
        let upper = symbol.trim().to_uppercase();
        self.assets.iter().find(|a| a.symbol == upper)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl Default for AssetUniverse {
    /// Dogecoin, Cardano and VeChain.
    fn default() -> Self {
        Self::new(vec![Asset::dogecoin(), Asset::cardano(), Asset::vechain()])
    }
}
