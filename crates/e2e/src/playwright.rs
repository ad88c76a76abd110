//! Playwright browser automation
//!
//! A [`BrowserSession`] owns one Node process running Playwright with a
//! single browser context and page. Rust writes one JSON request per line to
//! the bridge's stdin and reads one JSON reply per line from its stdout:
//!
//! ```text
//! -> {"id":7,"op":"count","locator":{"steps":[{"kind":"css","selector":".product-item"}]}}
//! <- {"id":7,"ok":true,"value":12}
//! ```
//!
//! Requests are strictly sequential; the bridge never has more than one in
//! flight.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command as TokioCommand};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::driver::{LoadState, PageDriver, WaitState};
use crate::error::{E2eError, E2eResult};
use crate::locator::Locator;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl FromStr for Browser {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chromium" | "chrome" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" | "safari" => Ok(Browser::Webkit),
            other => Err(E2eError::InvalidConfig(format!("unknown browser: {}", other))),
        }
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub browser: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Playwright's default action and navigation timeout
    pub timeout: Duration,
    /// Directory holding the `playwright` npm package
    pub node_modules: PathBuf,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            browser: Browser::Chromium,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            timeout: Duration::from_secs(30),
            node_modules: PathBuf::from("node_modules"),
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum BridgeOp<'a> {
    Goto {
        url: &'a str,
    },
    Reload,
    Url,
    Fill {
        locator: &'a Locator,
        value: &'a str,
    },
    Click {
        locator: &'a Locator,
        force: bool,
    },
    Hover {
        locator: &'a Locator,
    },
    TextContent {
        locator: &'a Locator,
    },
    AllTextContents {
        locator: &'a Locator,
    },
    Count {
        locator: &'a Locator,
    },
    IsVisible {
        locator: &'a Locator,
        timeout_ms: Option<u64>,
    },
    WaitFor {
        locator: &'a Locator,
        state: WaitState,
        timeout_ms: Option<u64>,
    },
    ScrollIntoView {
        locator: &'a Locator,
    },
    WaitForUrl {
        pattern: &'a str,
    },
    WaitForLoadState {
        state: LoadState,
    },
    Screenshot {
        path: &'a Path,
    },
    Close,
}

#[derive(Serialize)]
struct Request<'a> {
    id: u64,
    #[serde(flatten)]
    command: BridgeOp<'a>,
}

#[derive(Debug, Deserialize)]
struct Response {
    id: u64,
    ok: bool,
    #[serde(default)]
    value: Value,
    #[serde(default)]
    error: Option<String>,
}

struct BridgeIo {
    stdin: ChildStdin,
    lines: Lines<BufReader<ChildStdout>>,
}

impl BridgeIo {
    async fn send(&mut self, line: &str) -> E2eResult<()> {
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.write_all(b"\n").await?;
        self.stdin.flush().await?;
        Ok(())
    }

    /// Read until the reply for `id`, skipping anything that is not one
    async fn recv(&mut self, id: u64) -> E2eResult<Response> {
        while let Some(line) = self.lines.next_line().await? {
            match serde_json::from_str::<Response>(&line) {
                Ok(response) if response.id == id => return Ok(response),
                Ok(response) => {
                    warn!("Discarding stale bridge reply {}", response.id);
                }
                Err(_) => debug!(target: "playwright", "{}", line),
            }
        }
        Err(E2eError::Bridge("bridge process exited".to_string()))
    }
}

/// One browser, one context, one page
pub struct BrowserSession {
    child: Child,
    io: Mutex<BridgeIo>,
    next_id: AtomicU64,
    call_timeout: Duration,
    closed: bool,
    // Holds bridge.js on disk for the life of the process
    _script_dir: tempfile::TempDir,
}

impl BrowserSession {
    /// Start the bridge and wait for the browser to come up
    pub async fn launch(config: &PlaywrightConfig) -> E2eResult<Self> {
        Self::check_playwright_installed()?;

        let script_dir = tempfile::tempdir()?;
        let script_path = script_dir.path().join("bridge.js");
        std::fs::write(&script_path, build_bridge_script(config))?;

        let node_path = if config.node_modules.is_absolute() {
            config.node_modules.clone()
        } else {
            std::env::current_dir()?.join(&config.node_modules)
        };

        info!(
            "Launching {} via Playwright (headless: {})",
            config.browser.as_str(),
            config.headless
        );

        let mut child = TokioCommand::new("node")
            .arg(&script_path)
            .env("NODE_PATH", &node_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| E2eError::Bridge(format!("failed to spawn node: {}", e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| E2eError::Bridge("bridge stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| E2eError::Bridge("bridge stdout unavailable".to_string()))?;
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!(target: "playwright", "{}", line);
                }
            });
        }

        let call_timeout = config.timeout * 2 + Duration::from_secs(5);
        let session = Self {
            child,
            io: Mutex::new(BridgeIo {
                stdin,
                lines: BufReader::new(stdout).lines(),
            }),
            next_id: AtomicU64::new(1),
            call_timeout,
            closed: false,
            _script_dir: script_dir,
        };

        // The bridge announces itself with id 0 once the page exists
        let ready = {
            let mut io = session.io.lock().await;
            timeout(call_timeout, io.recv(0)).await
        };
        match ready {
            Ok(Ok(response)) if response.ok => {
                info!("Browser ready");
                Ok(session)
            }
            Ok(Ok(response)) => Err(E2eError::Bridge(format!(
                "browser launch failed: {}",
                response.error.unwrap_or_default()
            ))),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(E2eError::Bridge(format!(
                "browser did not start within {:?}",
                call_timeout
            ))),
        }
    }

    fn check_playwright_installed() -> E2eResult<()> {
        let output = Command::new("npx")
            .args(["playwright", "--version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match output {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }

    async fn call(&self, command: BridgeOp<'_>) -> E2eResult<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let line = serde_json::to_string(&Request { id, command })?;
        debug!("bridge -> {}", line);

        let mut io = self.io.lock().await;
        io.send(&line).await?;
        let response = timeout(self.call_timeout, io.recv(id))
            .await
            .map_err(|_| {
                E2eError::Bridge(format!(
                    "no reply to request {} within {:?}",
                    id, self.call_timeout
                ))
            })??;

        if response.ok {
            Ok(response.value)
        } else {
            Err(E2eError::Driver(
                response
                    .error
                    .unwrap_or_else(|| "unknown bridge error".to_string()),
            ))
        }
    }

    /// Close the browser and wait for the bridge to exit
    pub async fn close(mut self) -> E2eResult<()> {
        info!("Closing browser session");
        if let Err(e) = self.call(BridgeOp::Close).await {
            warn!("Bridge close failed: {}", e);
        }
        match timeout(Duration::from_secs(5), self.child.wait()).await {
            Ok(Ok(status)) => debug!("Bridge exited with {}", status),
            _ => {
                warn!("Bridge did not exit, killing it");
                let _ = self.child.kill().await;
            }
        }
        self.closed = true;
        Ok(())
    }

    fn terminate(&mut self) {
        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            if let Some(pid) = self.child.id() {
                // Playwright closes its browsers on SIGTERM
                if kill(Pid::from_raw(pid as i32), Signal::SIGTERM).is_ok() {
                    return;
                }
            }
        }

        let _ = self.child.start_kill();
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if !self.closed {
            debug!("BrowserSession dropped without close, terminating bridge");
            self.terminate();
        }
    }
}

fn as_bool(value: Value, op: &str) -> E2eResult<bool> {
    value
        .as_bool()
        .ok_or_else(|| E2eError::Bridge(format!("{} returned {}", op, value)))
}

fn millis(timeout: Option<Duration>) -> Option<u64> {
    timeout.map(|t| t.as_millis() as u64)
}

#[async_trait]
impl PageDriver for BrowserSession {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        debug!("Navigating to {}", url);
        self.call(BridgeOp::Goto { url }).await.map(drop)
    }

    async fn reload(&self) -> E2eResult<()> {
        self.call(BridgeOp::Reload).await.map(drop)
    }

    async fn current_url(&self) -> E2eResult<String> {
        let value = self.call(BridgeOp::Url).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn fill(&self, locator: &Locator, value: &str) -> E2eResult<()> {
        self.call(BridgeOp::Fill { locator, value }).await.map(drop)
    }

    async fn click(&self, locator: &Locator) -> E2eResult<()> {
        self.call(BridgeOp::Click {
            locator,
            force: false,
        })
        .await
        .map(drop)
    }

    async fn force_click(&self, locator: &Locator) -> E2eResult<()> {
        self.call(BridgeOp::Click {
            locator,
            force: true,
        })
        .await
        .map(drop)
    }

    async fn hover(&self, locator: &Locator) -> E2eResult<()> {
        self.call(BridgeOp::Hover { locator }).await.map(drop)
    }

    async fn text_content(&self, locator: &Locator) -> E2eResult<Option<String>> {
        let value = self.call(BridgeOp::TextContent { locator }).await?;
        Ok(value.as_str().map(String::from))
    }

    async fn all_text_contents(&self, locator: &Locator) -> E2eResult<Vec<String>> {
        let value = self.call(BridgeOp::AllTextContents { locator }).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn count(&self, locator: &Locator) -> E2eResult<usize> {
        let value = self.call(BridgeOp::Count { locator }).await?;
        value
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| E2eError::Bridge(format!("count returned {}", value)))
    }

    async fn is_visible(&self, locator: &Locator, timeout: Option<Duration>) -> E2eResult<bool> {
        let value = self
            .call(BridgeOp::IsVisible {
                locator,
                timeout_ms: millis(timeout),
            })
            .await?;
        as_bool(value, "is_visible")
    }

    async fn wait_for(
        &self,
        locator: &Locator,
        state: WaitState,
        timeout: Option<Duration>,
    ) -> E2eResult<bool> {
        let value = self
            .call(BridgeOp::WaitFor {
                locator,
                state,
                timeout_ms: millis(timeout),
            })
            .await?;
        as_bool(value, "wait_for")
    }

    async fn scroll_into_view(&self, locator: &Locator) -> E2eResult<()> {
        self.call(BridgeOp::ScrollIntoView { locator }).await.map(drop)
    }

    async fn wait_for_url(&self, pattern: &str) -> E2eResult<()> {
        debug!("Waiting for URL to match {}", pattern);
        self.call(BridgeOp::WaitForUrl { pattern }).await.map(drop)
    }

    async fn wait_for_load_state(&self, state: LoadState) -> E2eResult<()> {
        self.call(BridgeOp::WaitForLoadState { state }).await.map(drop)
    }

    async fn screenshot(&self, path: &Path) -> E2eResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.call(BridgeOp::Screenshot { path }).await.map(drop)
    }
}

/// Build the Node side of the bridge for `config`
pub fn build_bridge_script(config: &PlaywrightConfig) -> String {
    let settings = json!({
        "browser": config.browser.as_str(),
        "headless": config.headless,
        "viewport": { "width": config.viewport_width, "height": config.viewport_height },
        "timeout": config.timeout.as_millis() as u64,
    });

    format!(
        "const SETTINGS = {settings};\n{body}",
        settings = settings,
        body = BRIDGE_BODY
    )
}

const BRIDGE_BODY: &str = r#"
const readline = require('readline');
const playwright = require('playwright');

const reply = (msg) => process.stdout.write(JSON.stringify(msg) + '\n');

const isTimeout = (e) => e && e.name === 'TimeoutError';

(async () => {
  let browser;
  try {
    browser = await playwright[SETTINGS.browser].launch({ headless: SETTINGS.headless });
  } catch (e) {
    reply({ id: 0, ok: false, error: e.message });
    process.exit(1);
  }
  const context = await browser.newContext({ viewport: SETTINGS.viewport });
  context.setDefaultTimeout(SETTINGS.timeout);
  const page = await context.newPage();

  const resolve = (locator) => locator.steps.reduce((target, step) => {
    switch (step.kind) {
      case 'css': return target.locator(step.selector);
      case 'title': return target.getByTitle(step.text);
      case 'label': return target.getByLabel(step.text);
      case 'role': return target.getByRole(step.role, step.name == null ? {} : { name: step.name });
      case 'nth': return target.nth(step.index);
      case 'has_text': return target.filter({ hasText: step.text });
      default: throw new Error('unknown locator step: ' + step.kind);
    }
  }, page);

  const waitFor = async (r, state) => {
    const options = { state };
    if (r.timeout_ms != null) options.timeout = r.timeout_ms;
    try {
      await resolve(r.locator).first().waitFor(options);
      return true;
    } catch (e) {
      if (isTimeout(e)) return false;
      throw e;
    }
  };

  const handlers = {
    goto: async (r) => { await page.goto(r.url); },
    reload: async () => { await page.reload(); },
    url: async () => page.url(),
    fill: async (r) => { await resolve(r.locator).fill(r.value); },
    click: async (r) => { await resolve(r.locator).click({ force: r.force }); },
    hover: async (r) => { await resolve(r.locator).hover(); },
    text_content: async (r) => {
      const target = resolve(r.locator);
      if ((await target.count()) === 0) return null;
      return target.first().textContent();
    },
    all_text_contents: async (r) => resolve(r.locator).allTextContents(),
    count: async (r) => resolve(r.locator).count(),
    is_visible: async (r) => r.timeout_ms == null
      ? resolve(r.locator).first().isVisible()
      : waitFor(r, 'visible'),
    wait_for: async (r) => waitFor(r, r.state),
    scroll_into_view: async (r) => { await resolve(r.locator).first().scrollIntoViewIfNeeded(); },
    wait_for_url: async (r) => { await page.waitForURL(new RegExp(r.pattern)); },
    wait_for_load_state: async (r) => { await page.waitForLoadState(r.state); },
    screenshot: async (r) => { await page.screenshot({ path: r.path, fullPage: true }); },
    close: async () => { await browser.close(); },
  };

  reply({ id: 0, ok: true, value: 'ready' });

  const input = readline.createInterface({ input: process.stdin });
  for await (const line of input) {
    if (!line.trim()) continue;
    const request = JSON.parse(line);
    const handler = handlers[request.op];
    try {
      if (!handler) throw new Error('unknown op: ' + request.op);
      const value = await handler(request);
      reply({ id: request.id, ok: true, value: value === undefined ? null : value });
    } catch (e) {
      reply({ id: request.id, ok: false, error: e.message });
    }
    if (request.op === 'close') break;
  }
  await browser.close().catch(() => {});
  process.exit(0);
})();

process.on('SIGTERM', () => process.exit(0));
"#;
