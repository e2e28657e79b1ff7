use dotenv::dotenv;

/// One instrument the sampler tracks: its symbolic name and the endpoint
/// that serves its current index price.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedInstrument {
    pub name: String,
    pub endpoint: String,
}

pub struct Config {
    pub database_path: String,
    pub fetch_interval_secs: u64,
    pub api_host: String,
    pub api_port: u16,
    pub instruments: Vec<TrackedInstrument>,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenv().ok();

        Ok(Config {
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "./data/prices.db".to_string()),
            fetch_interval_secs: std::env::var("FETCH_INTERVAL")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap_or(60),
            api_host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .unwrap_or(8000),
            instruments: std::env::var("INSTRUMENTS")
                .map(|raw| parse_instruments(&raw))
                .unwrap_or_else(|_| default_instruments()),
        })
    }
}

/// Parse an `INSTRUMENTS` value of the form `name=url,name=url`. Entries
/// without a `=` are dropped.
fn parse_instruments(raw: &str) -> Vec<TrackedInstrument> {
    raw.split(',')
        .filter_map(|entry| {
            let (name, endpoint) = entry.split_once('=')?;
            let name = name.trim();
            let endpoint = endpoint.trim();
            if name.is_empty() || endpoint.is_empty() {
                return None;
            }
            Some(TrackedInstrument {
                name: name.to_string(),
                endpoint: endpoint.to_string(),
            })
        })
        .collect()
}

fn default_instruments() -> Vec<TrackedInstrument> {
    vec![
        TrackedInstrument {
            name: "btc_usd".to_string(),
            endpoint: "https://www.deribit.com/api/v2/public/get_index_price?index_name=btc_usd"
                .to_string(),
        },
        TrackedInstrument {
            name: "eth_usd".to_string(),
            endpoint: "https://www.deribit.com/api/v2/public/get_index_price?index_name=eth_usd"
                .to_string(),
        },
    ]
}
