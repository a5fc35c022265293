use anyhow::{Result, bail};
use lettre::Address;
use std::net::ToSocketAddrs;
use url::Host;

use crate::config::{TimeoutUnit, split_recipients};

pub fn validate_non_empty(label: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        bail!("{label} cannot be empty");
    }
    Ok(trimmed.to_string())
}

pub fn validate_email(value: &str) -> Result<String> {
    let email = validate_non_empty("email", value)?;
    if let Err(e) = email.parse::<Address>() {
        bail!("'{email}' is not a valid email address: {e}");
    }
    Ok(email)
}

/// Comma-separated addresses, each of which must parse.
pub fn validate_recipients(value: &str) -> Result<String> {
    let recipients = split_recipients(value);
    if recipients.is_empty() {
        bail!("at least one recipient is required");
    }
    for recipient in &recipients {
        validate_email(recipient)?;
    }
    Ok(recipients.join(", "))
}

pub fn validate_positive(label: &str, value: &str) -> Result<u64> {
    match value.trim().parse::<u64>() {
        Ok(0) | Err(_) => bail!("{label} must be a positive integer"),
        Ok(parsed) => Ok(parsed),
    }
}

pub fn validate_port(value: &str) -> Result<u16> {
    let port = validate_positive("port", value)?;
    u16::try_from(port).map_err(|_| anyhow::anyhow!("port must be at most {}", u16::MAX))
}

/// A syntactically valid DNS name with at least two labels.
pub fn validate_smtp_host(value: &str) -> Result<String> {
    let server = validate_non_empty("SMTP server", value)?;
    match Host::parse(&server) {
        Ok(Host::Domain(domain)) if domain.contains('.') && !domain.ends_with('.') => Ok(domain),
        _ => bail!("'{server}' is not a valid domain name"),
    }
}

/// Whether `server` resolves to at least one address.
pub fn is_server_reachable(server: &str, port: u16) -> bool {
    (server, port)
        .to_socket_addrs()
        .is_ok_and(|mut addrs| addrs.next().is_some())
}

pub fn unit_index(unit: TimeoutUnit) -> usize {
    match unit {
        TimeoutUnit::Hours => 0,
        TimeoutUnit::Minutes => 1,
        TimeoutUnit::Seconds => 2,
    }
}

pub fn unit_from_index(index: usize) -> TimeoutUnit {
    match index {
        1 => TimeoutUnit::Minutes,
        2 => TimeoutUnit::Seconds,
        _ => TimeoutUnit::Hours,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_non_empty_rejects_blank() {
        assert!(validate_non_empty("x", "   ").is_err());
        assert_eq!(validate_non_empty("x", " y ").unwrap(), "y");
    }

    #[test]
    fn email_must_parse() {
        assert_eq!(
            validate_email(" bot@example.com ").unwrap(),
            "bot@example.com"
        );
        assert!(validate_email("bot.example.com").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn recipients_are_normalized() {
        assert_eq!(
            validate_recipients("a@example.com,b@example.com ,").unwrap(),
            "a@example.com, b@example.com"
        );
        assert!(validate_recipients("a@example.com, nope").is_err());
        assert!(validate_recipients(" , ").is_err());
    }

    #[test]
    fn positive_rejects_zero_and_text() {
        assert_eq!(validate_positive("timeout", "30").unwrap(), 30);
        assert!(validate_positive("timeout", "0").is_err());
        assert!(validate_positive("timeout", "-4").is_err());
        assert!(validate_positive("timeout", "soon").is_err());
    }

    #[test]
    fn port_fits_u16() {
        assert_eq!(validate_port("587").unwrap(), 587);
        assert!(validate_port("70000").is_err());
    }

    #[test]
    fn smtp_host_needs_domain_shape() {
        assert_eq!(
            validate_smtp_host("smtp.example.com").unwrap(),
            "smtp.example.com"
        );
        assert!(validate_smtp_host("localhost").is_err());
        assert!(validate_smtp_host("not a host").is_err());
        assert!(validate_smtp_host("10.0.0.1").is_err());
    }

    #[test]
    fn unit_index_round_trips_for_select() {
        for unit in [TimeoutUnit::Hours, TimeoutUnit::Minutes, TimeoutUnit::Seconds] {
            assert_eq!(unit_from_index(unit_index(unit)), unit);
        }
    }
}
