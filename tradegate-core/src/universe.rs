//! Symbol universes — named index constituent lists — and the deterministic
//! daily watchlist.
//!
//! A universe is stored as TOML: one array of symbols per index name.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;

use crate::config::ConfigError;

/// Named symbol lists, keyed by index name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Universe {
    pub indices: BTreeMap<String, Vec<String>>,
}

impl Universe {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(format!("universe: {e}")))
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(format!("universe: {e}")))
    }

    /// Symbols of one index, in their listed order.
    pub fn index(&self, name: &str) -> Option<&[String]> {
        self.indices.get(name).map(|v| v.as_slice())
    }

    pub fn index_names(&self) -> Vec<&str> {
        self.indices.keys().map(|s| s.as_str()).collect()
    }

    /// Every distinct symbol across all indices, sorted.
    pub fn all_symbols(&self) -> Vec<&str> {
        self.indices
            .values()
            .flatten()
            .map(|s| s.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn symbol_count(&self) -> usize {
        self.all_symbols().len()
    }

    /// NSE indices tracked by default.
    pub fn default_nse() -> Self {
        let mut indices = BTreeMap::new();
        let mut add = |name: &str, symbols: &[&str]| {
            indices.insert(
                name.to_string(),
                symbols.iter().map(|s| s.to_string()).collect(),
            );
        };

        add(
            "NIFTY 50",
            &[
                "RELIANCE", "TCS", "INFY", "HDFCBANK", "ICICIBANK", "SBIN", "ITC", "LT",
                "AXISBANK", "KOTAKBANK", "HINDUNILVR", "BHARTIARTL", "BAJFINANCE", "ASIANPAINT",
                "HCLTECH", "TITAN", "MARUTI", "SUNPHARMA", "ULTRACEMCO", "NTPC", "POWERGRID",
                "NESTLEIND", "ONGC", "ADANIENT", "ADANIPORTS", "WIPRO", "JSWSTEEL", "TATAMOTORS",
                "COALINDIA", "BPCL", "INDUSINDBK", "BAJAJFINSV", "HDFCLIFE", "SBILIFE",
                "DIVISLAB", "DRREDDY", "EICHERMOT", "GRASIM", "HEROMOTOCO", "BRITANNIA",
                "HINDALCO", "TATASTEEL", "APOLLOHOSP", "CIPLA", "M&M", "SHREECEM", "TECHM", "UPL",
            ],
        );
        add(
            "NIFTY NEXT 50",
            &[
                "ADANIGREEN", "ADANIPOWER", "AMBUJACEM", "AUROPHARMA", "BANDHANBNK", "BERGEPAINT",
                "BIOCON", "BOSCHLTD", "CANBK", "CHOLAFIN", "COLPAL", "DABUR", "DLF", "GAIL",
                "GODREJCP", "HAVELLS", "ICICIPRULI", "IGL", "INDIGO", "JINDALSTEL", "LTFH",
                "LICHSGFIN", "LUPIN", "MARICO", "MUTHOOTFIN", "NAUKRI", "NMDC", "PAGEIND",
                "PETRONET", "PIDILITIND", "PNB", "SIEMENS", "SRF", "TATACOMM", "TORNTPHARM",
                "TVSMOTOR", "UBL", "VEDL", "VOLTAS", "ZEEL",
            ],
        );
        add(
            "NIFTY MIDCAP 100",
            &[
                "ABCAPITAL", "ALKEM", "ASHOKLEY", "ASTRAL", "ATUL", "BAJAJHLDNG", "BALKRISIND",
                "BEL", "BHARATFORG", "BHEL", "CANFINHOME", "COFORGE", "CONCOR", "CROMPTON",
                "CUMMINSIND", "ESCORTS", "EXIDEIND", "FEDERALBNK", "GLENMARK", "HAL", "HINDPETRO",
                "IDFCFIRSTB", "IRCTC", "JUBLFOOD", "LALPATHLAB", "LICI", "LTTS", "MFSL", "MPHASIS",
                "OBEROIRLTY", "PERSISTENT", "POLYCAB", "SAIL", "SUNTV", "TATACHEM", "TATAPOWER",
                "TORNTPOWER", "TRENT", "UNITDSPR", "ZOMATO",
            ],
        );
        add(
            "NIFTY SMALLCAP 100",
            &[
                "AARTIIND", "AFFLE", "BALAMINES", "BIRLACORPN", "CAMS", "CLEAN", "CYIENT",
                "DEEPAKNTR", "EDELWEISS", "ELGIEQUIP", "FINEORG", "GRANULES", "GSPL", "HFCL",
                "IEX", "INDIACEM", "IRB", "JBCHEPHARM", "JKCEMENT", "KALYANKJIL", "KEI",
                "KPITTECH", "LATENTVIEW", "MAHLOG", "METROPOLIS", "NBCC", "NIITLTD", "POLYMED",
                "RAILTEL", "ROUTE", "SONACOMS", "SPANDANA", "STAR", "SUPREMEIND", "TATAELXSI",
                "TRIDENT", "VGUARD", "WELCORP",
            ],
        );

        Self { indices }
    }
}

/// Deterministic pick of `size` distinct symbols for `date`.
///
/// Seeded by a BLAKE3 digest of the date and the sorted symbol list, so the
/// same list yields the same watchlist all day regardless of input order, and
/// a different one tomorrow. Each digest byte selects `byte % len`; repeats
/// are skipped.
pub fn daily_watchlist(symbols: &[String], date: NaiveDate, size: usize) -> Vec<String> {
    let pool: Vec<&str> = symbols
        .iter()
        .map(|s| s.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let size = size.min(pool.len());
    if size == 0 {
        return Vec::new();
    }

    let mut hasher = blake3::Hasher::new();
    hasher.update(date.format("%Y-%m-%d").to_string().as_bytes());
    for symbol in &pool {
        hasher.update(b"_");
        hasher.update(symbol.as_bytes());
    }
    let mut stream = hasher.finalize_xof();

    let mut picks: Vec<String> = Vec::with_capacity(size);
    let mut byte = [0u8; 1];
    // Bounded so tiny pools with unlucky draws still terminate.
    for _ in 0..pool.len() * 256 {
        if picks.len() == size || stream.read_exact(&mut byte).is_err() {
            break;
        }
        let symbol = pool[usize::from(byte[0]) % pool.len()];
        if !picks.iter().any(|p| p == symbol) {
            picks.push(symbol.to_string());
        }
    }
    picks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn default_universe_has_indices() {
        let u = Universe::default_nse();
        assert_eq!(u.index_names().len(), 4);
        assert!(u.index("NIFTY 50").unwrap().contains(&"RELIANCE".to_string()));
        assert!(u.symbol_count() > 150);
    }

    #[test]
    fn toml_roundtrip() {
        let u = Universe::default_nse();
        let parsed = Universe::from_toml(&u.to_toml().unwrap()).unwrap();
        assert_eq!(u, parsed);
    }

    #[test]
    fn parses_hand_written_toml() {
        let u = Universe::from_toml(
            r#"
            [indices]
            "BANKS" = ["SBIN", "HDFCBANK"]
            "IT" = ["TCS", "INFY", "SBIN"]
            "#,
        )
        .unwrap();
        assert_eq!(u.all_symbols(), vec!["HDFCBANK", "INFY", "SBIN", "TCS"]);
    }

    #[test]
    fn watchlist_is_stable_within_a_day() {
        let symbols = Universe::default_nse().index("NIFTY 50").unwrap().to_vec();
        let a = daily_watchlist(&symbols, date(4), 5);
        let b = daily_watchlist(&symbols, date(4), 5);
        assert_eq!(a, b);
        assert_eq!(a.len(), 5);

        let mut reversed = symbols.clone();
        reversed.reverse();
        assert_eq!(daily_watchlist(&reversed, date(4), 5), a);
    }

    #[test]
    fn watchlist_picks_are_distinct_members() {
        let symbols = Universe::default_nse().index("NIFTY NEXT 50").unwrap().to_vec();
        let picks = daily_watchlist(&symbols, date(5), 10);
        let unique: BTreeSet<_> = picks.iter().collect();
        assert_eq!(unique.len(), 10);
        assert!(picks.iter().all(|p| symbols.contains(p)));
    }

    #[test]
    fn watchlist_changes_across_days() {
        let symbols = Universe::default_nse().index("NIFTY MIDCAP 100").unwrap().to_vec();
        let week: BTreeSet<Vec<String>> = (4..9)
            .map(|d| daily_watchlist(&symbols, date(d), 5))
            .collect();
        assert!(week.len() > 1);
    }

    #[test]
    fn oversized_request_returns_whole_pool() {
        let symbols = vec!["A".to_string(), "B".to_string(), "B".to_string()];
        let picks = daily_watchlist(&symbols, date(4), 10);
        assert_eq!(picks.len(), 2);
        assert!(daily_watchlist(&[], date(4), 3).is_empty());
    }
}
