use anyhow::{Result, bail};
use std::io::{self, BufRead, IsTerminal};
use zeroize::Zeroizing;

pub const PASSWORD_ENV: &str = "PINSEAL_PASSWORD";
pub const PIN_LEN: usize = 6;

/// Reads the password of an existing envelope.
///
/// Sources, first non-empty wins: `PINSEAL_PASSWORD`, one line of piped
/// stdin, an interactive prompt.
pub fn read_password() -> Result<Zeroizing<String>> {
    //  PINSEAL_PASSWORD=123456 pinseal unlock
    if let Some(pw) = password_from_env() {
        return Ok(pw);
    }

    //  echo 123456 | pinseal unlock
    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().lock().read_line(&mut buf)?;
        trim_newline(&mut buf);

        if !buf.is_empty() {
            return Ok(buf);
        }
    } else {
        let pw = Zeroizing::new(rpassword::prompt_password("PIN: ")?);
        if !pw.is_empty() {
            return Ok(pw);
        }
    }

    bail!("No password provided")
}

/// Reads the password when stdin carries other input.
///
/// Only `PINSEAL_PASSWORD` or an interactive prompt are accepted.
pub fn read_password_without_stdin() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        return Ok(pw);
    }

    if io::stdin().is_terminal() {
        let pw = Zeroizing::new(rpassword::prompt_password("PIN: ")?);
        if !pw.is_empty() {
            return Ok(pw);
        }
    }

    bail!("No password provided; set {PASSWORD_ENV} when piping the plaintext")
}

/// Reads one line of stdin without its line ending.
pub fn read_stdin_line() -> Result<Zeroizing<String>> {
    let mut buf = Zeroizing::new(String::new());
    io::stdin().lock().read_line(&mut buf)?;
    trim_newline(&mut buf);
    Ok(buf)
}

/// Reads a new PIN for a key file, asking twice when interactive.
pub fn read_new_pin() -> Result<Zeroizing<String>> {
    if let Some(pin) = password_from_env() {
        validate_pin(&pin)?;
        return Ok(pin);
    }

    let (pin1, pin2) = if io::stdin().is_terminal() {
        let pin1 = Zeroizing::new(rpassword::prompt_password(format!(
            "Set a {PIN_LEN}-digit PIN: "
        ))?);
        let pin2 = Zeroizing::new(rpassword::prompt_password("Confirm PIN: ")?);
        (pin1, pin2)
    } else {
        let stdin = io::stdin();
        let mut handle = stdin.lock();

        let mut pin1 = Zeroizing::new(String::new());
        let mut pin2 = Zeroizing::new(String::new());
        handle.read_line(&mut pin1)?;
        handle.read_line(&mut pin2)?;

        trim_newline(&mut pin1);
        trim_newline(&mut pin2);
        (pin1, pin2)
    };

    validate_pin(&pin1)?;
    if *pin1 != *pin2 {
        bail!("PINs do not match");
    }

    Ok(pin1)
}

/// A PIN is exactly [`PIN_LEN`] ASCII digits.
pub fn validate_pin(pin: &str) -> Result<()> {
    if pin.len() != PIN_LEN || !pin.bytes().all(|b| b.is_ascii_digit()) {
        bail!("PIN must be {PIN_LEN} digits");
    }
    Ok(())
}

fn password_from_env() -> Option<Zeroizing<String>> {
    std::env::var(PASSWORD_ENV)
        .ok()
        .filter(|pw| !pw.is_empty())
        .map(Zeroizing::new)
}

fn trim_newline(s: &mut String) {
    while s.ends_with('\n') || s.ends_with('\r') {
        s.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_digit_pin_is_valid() {
        assert!(validate_pin("123456").is_ok());
        assert!(validate_pin("000000").is_ok());
    }

    #[test]
    fn wrong_length_pin_is_rejected() {
        assert!(validate_pin("").is_err());
        assert!(validate_pin("12345").is_err());
        assert!(validate_pin("1234567").is_err());
    }

    #[test]
    fn non_digit_pin_is_rejected() {
        assert!(validate_pin("12345a").is_err());
        assert!(validate_pin("12 456").is_err());
        // six chars, but not ASCII digits
        assert!(validate_pin("١٢٣٤٥٦").is_err());
    }

    #[test]
    fn trim_newline_strips_crlf() {
        let mut s = String::from("123456\r\n");
        trim_newline(&mut s);
        assert_eq!(s, "123456");
    }
}
