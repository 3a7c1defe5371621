//! Network commands: ping and curl, over the injected [`HttpClient`].
//!
//! [`HttpClient`]: deskterm_net::HttpClient

use std::time::{Duration, Instant};

use deskterm_net::{percent_encode, HttpClient, HttpRequest, HttpResponse, Url};
use deskterm_types::error::{DesktermError, Result};

use crate::commands::usage_error;
use crate::interpreter::{Command, CommandOutput, Environment};

fn client<'e>(env: &'e Environment<'_>, cmd: &str) -> Result<&'e dyn HttpClient> {
    env.services
        .http
        .as_deref()
        .ok_or_else(|| DesktermError::Command(format!("{cmd}: network unavailable")))
}

// ---------------------------------------------------------------------------
// ping
// ---------------------------------------------------------------------------

struct PingCmd;
impl Command for PingCmd {
    fn name(&self) -> &str {
        "ping"
    }
    fn description(&self) -> &str {
        "Measure HTTP round-trip time to a host"
    }
    fn usage(&self) -> &str {
        "ping [-c N] <host>"
    }
    fn category(&self) -> &str {
        "network"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let mut count = env.config().network.ping_count;
        let mut host = None;
        let mut rest = args.iter();
        while let Some(&arg) = rest.next() {
            if arg == "-c" {
                let n = rest.next().ok_or_else(|| usage_error(self.usage()))?;
                count = n
                    .parse()
                    .ok()
                    .filter(|&n| n > 0)
                    .ok_or_else(|| DesktermError::Command(format!("ping: invalid count: {n}")))?;
            } else {
                host = Some(arg);
            }
        }
        let host = host.ok_or_else(|| usage_error(self.usage()))?;
        client(env, "ping")?;
        let mut url = Url::parse_lenient(host, "http")
            .ok_or_else(|| DesktermError::Command(format!("ping: cannot resolve {host}")))?;
        // An explicit scheme is taken as-is; bare hosts may fall back to HTTPS.
        let mut can_upgrade = !host.contains("://");
        let timeout = Duration::from_millis(env.config().network.ping_timeout_ms);

        env.emit(&format!("PING {} ({})", url.host, url.scheme));
        let mut rtts = Vec::new();
        for seq in 1..=count {
            let mut outcome = probe(client(env, "ping")?, &url, timeout);
            if outcome.is_err() && can_upgrade {
                can_upgrade = false;
                let secure = url.with_scheme("https");
                log::debug!("ping: {} failed over http, trying https", url.host);
                outcome = probe(client(env, "ping")?, &secure, timeout);
                if outcome.is_ok() {
                    url = secure;
                }
            }
            let line = match outcome {
                Ok((status, rtt)) => {
                    rtts.push(rtt);
                    format!(
                        "Reply from {}: seq={seq} status={status} time={}ms",
                        url.host,
                        rtt.as_millis()
                    )
                },
                Err(e) => format!("Request to {} failed: seq={seq} ({e})", url.host),
            };
            env.emit(&line);
        }
        Ok(CommandOutput::Text(ping_summary(&url.host, count, &rtts)))
    }
}

fn probe(http: &dyn HttpClient, url: &Url, timeout: Duration) -> Result<(u16, Duration)> {
    let req = HttpRequest::new("HEAD", url.clone()).timeout(timeout);
    let start = Instant::now();
    let resp = http.request(&req)?;
    Ok((resp.status_code, start.elapsed()))
}

fn ping_summary(host: &str, sent: u32, rtts: &[Duration]) -> String {
    let received = rtts.len() as u32;
    let loss = (sent - received.min(sent)) * 100 / sent.max(1);
    let mut out = format!(
        "--- {host} ping statistics ---\n\
         {sent} probes transmitted, {received} received, {loss}% loss"
    );
    if let (Some(min), Some(max)) = (rtts.iter().min(), rtts.iter().max()) {
        let avg = rtts.iter().sum::<Duration>() / received;
        out.push_str(&format!(
            "\nrtt min/avg/max = {}/{}/{} ms",
            min.as_millis(),
            avg.as_millis(),
            max.as_millis()
        ));
    }
    out
}

// ---------------------------------------------------------------------------
// curl
// ---------------------------------------------------------------------------

#[derive(Debug, Default, PartialEq)]
struct CurlArgs {
    method: Option<String>,
    headers: Vec<(String, String)>,
    data: Option<String>,
    include: bool,
    head: bool,
    follow: bool,
    proxy: bool,
    url: Option<String>,
}

fn parse_curl_args(args: &[&str]) -> Result<CurlArgs> {
    let missing = |flag: &str| DesktermError::Command(format!("curl: option {flag} requires a value"));
    let mut parsed = CurlArgs::default();
    let mut rest = args.iter();
    while let Some(&arg) = rest.next() {
        match arg {
            "-X" | "--request" => {
                parsed.method = Some(rest.next().ok_or_else(|| missing(arg))?.to_ascii_uppercase());
            },
            "-H" | "--header" => {
                let raw = rest.next().ok_or_else(|| missing(arg))?;
                let (name, value) = raw
                    .split_once(':')
                    .ok_or_else(|| DesktermError::Command(format!("curl: bad header: {raw}")))?;
                parsed
                    .headers
                    .push((name.trim().to_string(), value.trim().to_string()));
            },
            "-d" | "--data" => parsed.data = Some(rest.next().ok_or_else(|| missing(arg))?.to_string()),
            "-i" | "--include" => parsed.include = true,
            "-I" | "--head" => parsed.head = true,
            "-L" | "--location" => parsed.follow = true,
            "--proxy" => parsed.proxy = true,
            _ if arg.starts_with('-') => {
                return Err(DesktermError::Command(format!("curl: unknown option: {arg}")));
            },
            _ => parsed.url = Some(arg.to_string()),
        }
    }
    Ok(parsed)
}

struct CurlCmd;
impl Command for CurlCmd {
    fn name(&self) -> &str {
        "curl"
    }
    fn description(&self) -> &str {
        "Transfer data from a URL"
    }
    fn usage(&self) -> &str {
        "curl [-X METHOD] [-H 'Name: value'] [-d body] [-i] [-I] [-L] [--proxy] <url>"
    }
    fn category(&self) -> &str {
        "network"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let opts = parse_curl_args(args)?;
        let target = opts.url.as_deref().ok_or_else(|| usage_error(self.usage()))?;
        let net = &env.config().network;
        let target = if opts.proxy {
            format!("{}{}", net.cors_proxy, percent_encode(target))
        } else {
            target.to_string()
        };
        let url = Url::parse_lenient(&target, "http")
            .ok_or_else(|| DesktermError::Command(format!("curl: malformed URL: {target}")))?;

        let method = match (&opts.method, opts.head, &opts.data) {
            (Some(m), _, _) => m.clone(),
            (None, true, _) => "HEAD".to_string(),
            (None, false, Some(_)) => "POST".to_string(),
            (None, false, None) => "GET".to_string(),
        };
        let max_bytes = net.curl_max_bytes;
        let mut req = HttpRequest::new(&method, url)
            .timeout(Duration::from_millis(net.request_timeout_ms))
            .follow_redirects(opts.follow);
        for (name, value) in &opts.headers {
            req = req.header(name, value);
        }
        if let Some(data) = &opts.data {
            req = req.body(data.clone());
        }

        let resp = client(env, "curl")?.request(&req)?;
        log::debug!("curl {method} {} -> {}", req.url, resp.status_code);
        Ok(CommandOutput::Text(render_response(
            &resp,
            opts.include || opts.head,
            !opts.head,
            max_bytes,
        )))
    }
}

fn render_response(resp: &HttpResponse, headers: bool, body: bool, max_bytes: usize) -> String {
    let mut out = String::new();
    if headers {
        out.push_str(&format!("HTTP/1.1 {} {}\n", resp.status_code, resp.reason));
        for (name, value) in &resp.headers {
            out.push_str(&format!("{name}: {value}\n"));
        }
        if body {
            out.push('\n');
        }
    }
    if body {
        out.push_str(&truncate_body(&resp.text(), max_bytes));
    }
    out
}

/// Cut `text` to at most `max` bytes on a char boundary, noting the full size.
fn truncate_body(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut cut = max;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}\n...\n(truncated, {} bytes total)", &text[..cut], text.len())
}

/// Register network commands.
pub fn register_network_commands(reg: &mut crate::CommandRegistry) {
    reg.register(Box::new(PingCmd));
    reg.register(Box::new(CurlCmd));
}
