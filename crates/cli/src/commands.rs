/// One line of user input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Buy { symbol: String, quantity: String },
    Sell { symbol: String, quantity: String },
    Chart { symbol: String },
    HideChart,
    Status,
    History,
    Refresh,
    Export { format: ExportFormat },
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl Command {
    /// Parse a command line. Quantities are passed through untouched so the
    /// core can validate them.
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err("empty command".into());
        };
        let args: Vec<&str> = words.collect();

        match (verb.to_lowercase().as_str(), args.as_slice()) {
            ("buy", [symbol, quantity]) => Ok(Command::Buy {
                symbol: symbol.to_uppercase(),
                quantity: quantity.to_string(),
            }),
            ("sell", [symbol, quantity]) => Ok(Command::Sell {
                symbol: symbol.to_uppercase(),
                quantity: quantity.to_string(),
            }),
            ("buy" | "sell", _) => Err(format!("usage: {verb} <SYMBOL> <QUANTITY>")),
            ("chart", [symbol]) => Ok(Command::Chart {
                symbol: symbol.to_uppercase(),
            }),
            ("chart", _) => Err("usage: chart <SYMBOL>".into()),
            ("hide", []) => Ok(Command::HideChart),
            ("status" | "s", []) => Ok(Command::Status),
            ("history" | "h", []) => Ok(Command::History),
            ("refresh" | "r", []) => Ok(Command::Refresh),
            ("export", [format]) => match format.to_lowercase().as_str() {
                "json" => Ok(Command::Export {
                    format: ExportFormat::Json,
                }),
                "csv" => Ok(Command::Export {
                    format: ExportFormat::Csv,
                }),
                other => Err(format!("unknown export format {other:?} (json or csv)")),
            },
            ("help" | "?", _) => Ok(Command::Help),
            ("quit" | "exit" | "q", _) => Ok(Command::Quit),
            _ => Err(format!("unknown command {line:?}, type `help`")),
        }
    }
}

pub const HELP: &str = "\
commands:
  buy <SYMBOL> <QTY>    buy coins with cash
  sell <SYMBOL> <QTY>   sell coins for cash
  chart <SYMBOL>        load the 24h hourly chart
  hide                  hide the chart
  status                cash, holdings and total value
  history               trades, newest first
  refresh               refresh prices now
  export json|csv       print the trade history
  quit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trades_with_uppercased_symbol() {
        assert_eq!(
            Command::parse("buy doge 100").unwrap(),
            Command::Buy {
                symbol: "DOGE".into(),
                quantity: "100".into()
            }
        );
        assert_eq!(
            Command::parse("  SELL ada 0.5 ").unwrap(),
            Command::Sell {
                symbol: "ADA".into(),
                quantity: "0.5".into()
            }
        );
    }

    #[test]
    fn keeps_bad_quantity_for_core_validation() {
        assert_eq!(
            Command::parse("buy vet abc").unwrap(),
            Command::Buy {
                symbol: "VET".into(),
                quantity: "abc".into()
            }
        );
    }

    #[test]
    fn trade_without_quantity_is_usage_error() {
        assert!(Command::parse("buy DOGE").unwrap_err().contains("usage"));
    }

    #[test]
    fn export_formats() {
        assert_eq!(
            Command::parse("export CSV").unwrap(),
            Command::Export {
                format: ExportFormat::Csv
            }
        );
        assert!(Command::parse("export xml").is_err());
    }

    #[test]
    fn empty_and_unknown() {
        assert!(Command::parse("   ").is_err());
        assert!(Command::parse("moon DOGE").is_err());
        assert_eq!(Command::parse("q").unwrap(), Command::Quit);
    }
}
