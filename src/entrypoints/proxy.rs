//! Interactive proxy prompt shown on the console before the window opens

use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("I/O error while prompting: {0}")]
    Io(#[from] io::Error),

    #[error("No proxy settings supplied..")]
    InvalidPort(String),
}

/// HTTP proxy used for tile downloads
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxySettings {
    pub host: String,
    pub port: u16,
}

impl ProxySettings {
    /// Proxy URL, adding an `http://` scheme when the host has none
    pub fn url(&self) -> String {
        if self.host.contains("://") {
            format!("{}:{}", self.host, self.port)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }

    /// Export the proxy to the environment read by the tile downloader.
    ///
    /// Must run before any other thread is spawned.
    pub fn apply(&self) {
        let url = self.url();
        tracing::info!("Using proxy {url}");
        // Safety: single-threaded at startup
        unsafe {
            std::env::set_var("HTTP_PROXY", &url);
            std::env::set_var("HTTPS_PROXY", &url);
        }
    }
}

/// Ask a yes/no question until a valid answer is given. An empty answer means yes.
///
/// End of input counts as no.
pub fn query_yes_no<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
) -> io::Result<bool> {
    loop {
        write!(output, "{question} [Y/n] ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Ok(false);
        }

        match line.trim().to_ascii_lowercase().as_str() {
            "" | "y" | "ye" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => writeln!(output, "Please respond with 'yes' or 'no' (or 'y' or 'n').")?,
        }
    }
}

fn read_answer<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> io::Result<String> {
    write!(output, "{prompt}")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Run the startup proxy prompt.
///
/// Returns `None` when the user declines, and [`ProxyError::InvalidPort`]
/// when the port is not a number between 0 and 65535.
pub fn prompt_proxy<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<Option<ProxySettings>, ProxyError> {
    let wants_proxy = query_yes_no(input, output, "Input Proxy Settings?")?;
    writeln!(output)?;
    if !wants_proxy {
        return Ok(None);
    }

    let host = read_answer(input, output, "Proxy:")?;
    let port = read_answer(input, output, "Proxy Port:")?;
    let port = port.parse::<u16>().map_err(|_| ProxyError::InvalidPort(port))?;

    Ok(Some(ProxySettings { host, port }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn ask(answers: &str) -> (io::Result<bool>, String) {
        let mut input = Cursor::new(answers.as_bytes().to_vec());
        let mut output = Vec::new();
        let result = query_yes_no(&mut input, &mut output, "Continue?");
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_yes_no_answers() {
        for answer in ["y\n", "ye\n", "yes\n", "YES\n", "\n"] {
            assert!(ask(answer).0.unwrap(), "{answer:?} should mean yes");
        }
        for answer in ["n\n", "no\n", "No\n"] {
            assert!(!ask(answer).0.unwrap(), "{answer:?} should mean no");
        }
    }

    #[test]
    fn test_invalid_answer_asks_again() {
        let (result, output) = ask("maybe\nn\n");
        assert!(!result.unwrap());
        assert_eq!(output.matches("Continue? [Y/n]").count(), 2);
        assert!(output.contains("Please respond"));
    }

    #[test]
    fn test_end_of_input_is_no() {
        assert!(!ask("").0.unwrap());
    }

    fn prompt(answers: &str) -> Result<Option<ProxySettings>, ProxyError> {
        let mut input = Cursor::new(answers.as_bytes().to_vec());
        prompt_proxy(&mut input, &mut Vec::new())
    }

    #[test]
    fn test_prompt_declined() {
        assert_eq!(prompt("n\n").unwrap(), None);
    }

    #[test]
    fn test_prompt_with_proxy() {
        let settings = prompt("yes\nproxy.local\n3128\n").unwrap().unwrap();
        assert_eq!(
            settings,
            ProxySettings {
                host: "proxy.local".into(),
                port: 3128
            }
        );
        assert_eq!(settings.url(), "http://proxy.local:3128");
    }

    #[test]
    fn test_prompt_invalid_port() {
        for answers in ["\nproxy.local\nabc\n", "y\nproxy.local\n70000\n", "y\nproxy.local\n\n"] {
            let err = prompt(answers).unwrap_err();
            assert!(matches!(err, ProxyError::InvalidPort(_)));
            assert_eq!(err.to_string(), "No proxy settings supplied..");
        }
    }

    #[test]
    fn test_url_keeps_scheme() {
        let settings = ProxySettings {
            host: "https://proxy.local".into(),
            port: 8443,
        };
        assert_eq!(settings.url(), "https://proxy.local:8443");
    }
}
