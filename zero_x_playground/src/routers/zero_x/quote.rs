use std::fmt;

use alloy::primitives::{Address, Bytes, U256};
use error_stack::{Report, report};
use rust_decimal::Decimal;

use crate::{
    error::{Error, PlaygroundResult},
    routers::zero_x::responses::{ZeroXQuoteResponse, ZeroXSource},
    utils::number_conversion::{
        parse_address, parse_decimal, parse_hex_bytes, parse_u256, required,
    },
};

/// A liquidity venue and the share of the route it fills.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub name: String,
    /// Share of the order in `[0, 1]`
    pub proportion: Decimal,
}

impl Source {
    fn from_response(index: usize, source: ZeroXSource) -> PlaygroundResult<Self> {
        let name_field = format!("sources[{index}].name");
        let proportion_field = format!("sources[{index}].proportion");

        let name = required(&name_field, source.name)?;
        let proportion = parse_decimal(
            &proportion_field,
            &required(&proportion_field, source.proportion)?,
        )?;

        if proportion < Decimal::ZERO || proportion > Decimal::ONE {
            return Err(report!(Error::DecodeError(proportion_field))
                .attach_printable(format!("Proportion {proportion} is outside [0, 1]")));
        }

        Ok(Self { name, proportion })
    }
}

/// A decoded `/swap/v0/quote` response.
///
/// Holds everything needed to submit the swap: `to`, `data`, `value` and
/// `gas_price` form the transaction, the rest describes the trade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub price: Decimal,
    /// Contract the fill transaction is sent to
    pub to: Address,
    /// Call data, possibly empty
    pub data: Bytes,
    /// Native currency attached to the fill
    pub value: U256,
    pub gas_price: U256,
    /// Gas limit estimated by the API
    pub gas: U256,
    pub protocol_fee: U256,
    pub buy_amount: U256,
    pub sell_amount: U256,
    pub sources: Vec<Source>,
    pub buy_token_address: Address,
    pub sell_token_address: Address,
}

impl TryFrom<ZeroXQuoteResponse> for Quote {
    type Error = Report<Error>;

    fn try_from(response: ZeroXQuoteResponse) -> Result<Self, Self::Error> {
        let sources = required("sources", response.sources)?
            .into_iter()
            .enumerate()
            .map(|(index, source)| Source::from_response(index, source))
            .collect::<PlaygroundResult<Vec<_>>>()?;

        Ok(Self {
            price: parse_decimal("price", &required("price", response.price)?)?,
            to: parse_address("to", &required("to", response.to)?)?,
            data: parse_hex_bytes("data", &required("data", response.data)?)?,
            value: parse_u256("value", &required("value", response.value)?)?,
            gas_price: parse_u256("gasPrice", &required("gasPrice", response.gas_price)?)?,
            gas: parse_u256("gas", &required("gas", response.gas)?)?,
            protocol_fee: parse_u256(
                "protocolFee",
                &required("protocolFee", response.protocol_fee)?,
            )?,
            buy_amount: parse_u256("buyAmount", &required("buyAmount", response.buy_amount)?)?,
            sell_amount: parse_u256(
                "sellAmount",
                &required("sellAmount", response.sell_amount)?,
            )?,
            sources,
            buy_token_address: parse_address(
                "buyTokenAddress",
                &required("buyTokenAddress", response.buy_token_address)?,
            )?,
            sell_token_address: parse_address(
                "sellTokenAddress",
                &required("sellTokenAddress", response.sell_token_address)?,
            )?,
        })
    }
}

/// Decodes a raw quote body. Either every field converts or nothing is returned.
pub fn decode_quote(body: &[u8]) -> PlaygroundResult<Quote> {
    let response: ZeroXQuoteResponse = serde_json::from_slice(body)
        .map_err(|e| report!(Error::SerdeDeserialize(format!("Invalid quote body: {e}"))))?;

    Quote::try_from(response)
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "price:        {}", self.price)?;
        writeln!(f, "sell:         {} of {}", self.sell_amount, self.sell_token_address)?;
        writeln!(f, "buy:          {} of {}", self.buy_amount, self.buy_token_address)?;
        writeln!(f, "to:           {}", self.to)?;
        writeln!(f, "value:        {}", self.value)?;
        writeln!(f, "gas price:    {}", self.gas_price)?;
        writeln!(f, "gas:          {}", self.gas)?;
        writeln!(f, "protocol fee: {}", self.protocol_fee)?;
        writeln!(f, "data:         {} bytes", self.data.len())?;
        write!(f, "sources:")?;
        for source in &self.sources {
            write!(f, "\n  {} {}", source.name, source.proportion)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use std::str::FromStr;

    const TO: &str = "0x61935cbdd02287b511119ddb11aeb42f1593b7ef";
    const WETH: &str = "0xd0a1e359811322d97991e03f863a0c30c2cf029c";
    const DAI: &str = "0x4f96fe3b7a6cf9725f59d353f723c1bdb64ca6aa";

    fn sample_body() -> Value {
        json!({
            "price": "0.01",
            "to": TO,
            "data": "0x1234",
            "value": "0",
            "gasPrice": "1000000000",
            "gas": "21000",
            "protocolFee": "0",
            "buyAmount": "100",
            "sellAmount": "1",
            "sources": [{"name": "Uniswap", "proportion": "1"}],
            "buyTokenAddress": DAI,
            "sellTokenAddress": WETH,
        })
    }

    fn decode(body: &Value) -> PlaygroundResult<Quote> {
        decode_quote(body.to_string().as_bytes())
    }

    fn decode_error_field(body: &Value) -> String {
        match decode(body).unwrap_err().current_context() {
            Error::DecodeError(field) => field.clone(),
            other => panic!("Expected DecodeError, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_sample_quote() {
        let quote = decode(&sample_body()).unwrap();

        assert_eq!(quote.price.to_string(), "0.01");
        assert_eq!(quote.to, Address::from_str(TO).unwrap());
        assert_eq!(quote.data, Bytes::from(vec![0x12, 0x34]));
        assert_eq!(quote.value, U256::ZERO);
        assert_eq!(quote.gas_price, U256::from(1_000_000_000u64));
        assert_eq!(quote.gas, U256::from(21_000u64));
        assert_eq!(quote.protocol_fee, U256::ZERO);
        assert_eq!(quote.buy_amount, U256::from(100u64));
        assert_eq!(quote.sell_amount, U256::from(1u64));
        assert_eq!(quote.sources.len(), 1);
        assert_eq!(quote.sources[0].name, "Uniswap");
        assert_eq!(quote.sources[0].proportion, Decimal::ONE);
        assert_eq!(quote.buy_token_address, Address::from_str(DAI).unwrap());
        assert_eq!(quote.sell_token_address, Address::from_str(WETH).unwrap());
    }

    #[test]
    fn test_decode_keeps_source_order_and_extra_fields() {
        let mut body = sample_body();
        body["sources"] = json!([
            {"name": "0x", "proportion": "0"},
            {"name": "Kyber", "proportion": "0.25"},
            {"name": "Uniswap", "proportion": "0.75"},
        ]);
        body["guaranteedPrice"] = json!("0.0099");

        let quote = decode(&body).unwrap();
        let names: Vec<&str> = quote.sources.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["0x", "Kyber", "Uniswap"]);
        assert_eq!(quote.sources[1].proportion, Decimal::from_str("0.25").unwrap());
    }

    #[test]
    fn test_decode_empty_call_data() {
        let mut body = sample_body();
        body["data"] = json!("0x");

        let quote = decode(&body).unwrap();
        assert!(quote.data.is_empty());
    }

    #[test]
    fn test_decode_256_bit_amount() {
        let mut body = sample_body();
        body["buyAmount"] = json!(U256::MAX.to_string());

        let quote = decode(&body).unwrap();
        assert_eq!(quote.buy_amount, U256::MAX);
    }

    #[test]
    fn test_missing_field_names_the_field() {
        let fields = [
            "price",
            "to",
            "data",
            "value",
            "gasPrice",
            "gas",
            "protocolFee",
            "buyAmount",
            "sellAmount",
            "sources",
            "buyTokenAddress",
            "sellTokenAddress",
        ];

        for field in fields {
            let mut body = sample_body();
            body.as_object_mut().unwrap().remove(field);
            assert_eq!(decode_error_field(&body), field, "missing {field}");
        }
    }

    #[test]
    fn test_malformed_field_names_the_field() {
        let cases = [
            ("price", "one cent"),
            ("to", "0xabc"),
            ("data", "0x123"),
            ("value", "-1"),
            ("gasPrice", "1e9"),
            ("gas", ""),
            ("protocolFee", "0.5"),
            ("buyAmount", "1,000"),
            ("sellAmount", "NaN"),
            ("buyTokenAddress", "DAI"),
            ("sellTokenAddress", "0x"),
        ];

        for (field, raw) in cases {
            let mut body = sample_body();
            body[field] = json!(raw);
            assert_eq!(decode_error_field(&body), field, "{field}={raw:?}");
        }
    }

    #[test]
    fn test_bad_source_fails_whole_quote() {
        let mut body = sample_body();
        body["sources"] = json!([
            {"name": "Uniswap", "proportion": "0.5"},
            {"name": "Kyber", "proportion": "half"},
        ]);
        assert_eq!(decode_error_field(&body), "sources[1].proportion");

        body["sources"] = json!([{"name": "Uniswap", "proportion": "1.5"}]);
        assert_eq!(decode_error_field(&body), "sources[0].proportion");

        body["sources"] = json!([{"proportion": "1"}]);
        assert_eq!(decode_error_field(&body), "sources[0].name");
    }

    #[test]
    fn test_numeric_json_is_not_accepted() {
        let mut body = sample_body();
        body["gas"] = json!(21000);

        let err = decode(&body).unwrap_err();
        assert!(matches!(err.current_context(), Error::SerdeDeserialize(_)));
    }

    #[test]
    fn test_invalid_json_body() {
        let err = decode_quote(b"<html>Service Unavailable</html>").unwrap_err();
        assert!(matches!(err.current_context(), Error::SerdeDeserialize(_)));
    }

    #[test]
    fn test_display_lists_sources() {
        let quote = decode(&sample_body()).unwrap();
        let printed = quote.to_string();
        assert!(printed.contains("price:        0.01"));
        assert!(printed.contains("Uniswap 1"));
    }
}
