use clap::Parser;

/// Courier — dispatch driver presence and location client.
#[derive(Parser, Debug)]
#[command(name = "courier", version, about)]
pub struct Args {
    /// Driver identifier for this session.
    #[arg(short = 'i', long, default_value = "driver-1")]
    pub driver_id: String,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Log level override (e.g. "courier=debug").
    #[arg(long)]
    pub log_level: Option<String>,

    /// Simulated start position as "lat,lng" (desktop runs have no GPS).
    #[arg(long, default_value = "52.2297,21.0122")]
    pub simulate: String,
}

pub fn parse() -> Args {
    Args::parse()
}

/// Parse a "lat,lng" pair.
pub fn parse_position(s: &str) -> Option<(f64, f64)> {
    let (lat, lng) = s.split_once(',')?;
    Some((lat.trim().parse().ok()?, lng.trim().parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_position_accepts_spaces() {
        assert_eq!(parse_position("10.5, -20.25"), Some((10.5, -20.25)));
    }

    #[test]
    fn parse_position_rejects_garbage() {
        assert_eq!(parse_position("not-a-position"), None);
        assert_eq!(parse_position("10.5"), None);
        assert_eq!(parse_position("a,b"), None);
    }
}
