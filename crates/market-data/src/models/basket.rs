//! The fixed basket of assets shown in the investment view.

/// Static description of one basket asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AssetSpec {
    /// Identifier shared with the remote source (CoinGecko coin id)
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Icon name used by the view layer
    pub icon: &'static str,
    /// Whether the remote source lists this asset
    pub listed: bool,
}

/// Identifier of the platform's own token. It is not listed on public markets.
pub const NATIVE_TOKEN_ID: &str = "ownsphere-token";

/// The basket, in display order.
pub const DEFAULT_BASKET: &[AssetSpec] = &[
    AssetSpec {
        id: NATIVE_TOKEN_ID,
        name: "OwnSphere Token",
        icon: "fa-coins",
        listed: false,
    },
    AssetSpec {
        id: "bitcoin",
        name: "Bitcoin",
        icon: "fa-bitcoin-sign",
        listed: true,
    },
    AssetSpec {
        id: "ethereum",
        name: "Ethereum",
        icon: "fa-ethereum",
        listed: true,
    },
    AssetSpec {
        id: "internet-computer",
        name: "Internet Computer",
        icon: "fa-globe",
        listed: true,
    },
];

/// Look up a basket asset by id.
pub fn find_asset(id: &str) -> Option<&'static AssetSpec> {
    DEFAULT_BASKET.iter().find(|asset| asset.id == id)
}

/// Ids of the basket assets the remote source can quote.
pub fn listed_ids(basket: &[AssetSpec]) -> Vec<&'static str> {
    basket
        .iter()
        .filter(|asset| asset.listed)
        .map(|asset| asset.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listed_ids_skip_native_token() {
        let ids = listed_ids(DEFAULT_BASKET);
        assert_eq!(ids, vec!["bitcoin", "ethereum", "internet-computer"]);
    }

    #[test]
    fn test_find_asset() {
        assert_eq!(find_asset("ethereum").map(|a| a.name), Some("Ethereum"));
        assert!(find_asset("dogecoin").is_none());
    }
}
