//! Thin terminal viewer for a running `cidlogsrv` data endpoint.
//!
//! Carried over from this workspace's original TUI viewer crate, which
//! rendered trace-system snapshot files directly off disk. That shape
//! doesn't fit here: §5 treats the store file as exclusively owned by
//! the server process, so the viewer instead becomes a client of the
//! wire protocol, the same way `demos/cidlogsrv-client` is — it polls
//! `QueryByCount` and `GetLiveEvents` over a `TcpStream` and renders
//! whatever comes back. Not a focus of this spec; kept intentionally
//! thin rather than porting the teacher's full multi-tab widget set.

use std::io::ErrorKind;
use std::net::TcpStream;
use std::time::{Duration, Instant};

use cidlogsrv_proto::{read_frame, write_frame, Reply, Request};
use cidlogsrv_store::LogEvent;
use clap::Parser;
use ratatui::{
  layout::{Constraint, Layout, Rect},
  style::{Color, Style},
  text::{Line, Span},
  widgets::{Block, BorderType, Borders, Row, Table},
  Frame,
};

#[derive(Debug, Parser)]
#[command(name = "cidlogsrv-view", about = "Terminal viewer for a cidlogsrv data endpoint")]
struct Args {
  /// Host:port of the data endpoint to connect to.
  #[arg(long, default_value = "127.0.0.1:8830")]
  addr: String,

  /// How many of the most recent events to keep on screen.
  #[arg(long, default_value_t = 200)]
  max_events: u32,
}

struct App {
  conn: TcpStream,
  watermark: u64,
  events: Vec<LogEvent>,
  max_events: usize,
  status: String,
}

impl App {
  fn connect(addr: &str, max_events: u32) -> std::io::Result<Self> {
    let conn = TcpStream::connect(addr)?;
    conn.set_read_timeout(Some(Duration::from_millis(500)))?;
    Ok(Self {
      conn,
      watermark: 0,
      events: Vec::new(),
      max_events: max_events.max(1) as usize,
      status: format!("connected to {addr}"),
    })
  }

  /// One poll cycle: a fresh `QueryByCount` snapshot to seed/refresh
  /// the table, plus a `GetLiveEvents` call to pick up anything newer
  /// than our last watermark (§4.E's subscriber protocol, including
  /// its synthetic desync/missed-events markers).
  fn poll(&mut self, request: &Request) -> std::io::Result<Reply> {
    write_frame(&mut self.conn, request)?;
    loop {
      match read_frame(&mut self.conn) {
        Ok(reply) => return Ok(reply),
        Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => continue,
        Err(e) => return Err(e),
      }
    }
  }

  fn tick(&mut self) {
    let max_return = self.max_events as u32;
    match self.poll(&Request::QueryByCount { max_return }) {
      Ok(Reply::Events(events)) => {
        self.events = events;
        self.status = format!("{} events, watermark {}", self.events.len(), self.watermark);
      }
      Ok(Reply::Error { message }) => self.status = format!("server error: {message}"),
      Ok(_) => {}
      Err(e) => self.status = format!("connection error: {e}"),
    }

    match self.poll(&Request::GetLiveEvents { watermark: self.watermark }) {
      Ok(Reply::LiveEvents { events, new_watermark }) => {
        self.watermark = new_watermark;
        for e in events {
          self.events.push(e);
        }
        if self.events.len() > self.max_events {
          let drop = self.events.len() - self.max_events;
          self.events.drain(0..drop);
        }
      }
      Ok(Reply::Error { message }) => self.status = format!("live-tail error: {message}"),
      Ok(_) => {}
      Err(e) => self.status = format!("connection error: {e}"),
    }
  }

  fn render(&self, f: &mut Frame<'_>, area: Rect) {
    let [table_area, status_area] =
      Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(area);

    let header = Row::new(["time", "sev", "host", "process", "message"])
      .style(Style::default().fg(Color::Yellow));
    let rows: Vec<Row> = self
      .events
      .iter()
      .rev()
      .take(table_area.height.saturating_sub(2) as usize)
      .map(|e| {
        Row::new([
          format!("{}", e.logged_at),
          format!("{:?}", e.severity),
          e.host.clone(),
          e.process.clone(),
          e.message.clone(),
        ])
      })
      .collect();

    let widths = [
      Constraint::Length(20),
      Constraint::Length(10),
      Constraint::Length(16),
      Constraint::Length(16),
      Constraint::Min(20),
    ];
    let table = Table::new(rows, widths).header(header).block(
      Block::default()
        .title("cidlogsrv live view (q to quit)")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded),
    );
    f.render_widget(table, table_area);

    let status = Line::from(Span::raw(self.status.clone()));
    f.render_widget(ratatui::widgets::Paragraph::new(status), status_area);
  }
}

fn main() -> color_eyre::Result<()> {
  color_eyre::install()?;
  let args = Args::parse();

  let mut app = App::connect(&args.addr, args.max_events)?;
  let terminal = ratatui::init();
  let result = run(terminal, &mut app);
  ratatui::restore();
  result
}

fn run(mut terminal: ratatui::DefaultTerminal, app: &mut App) -> color_eyre::Result<()> {
  let mut last_tick = Instant::now() - Duration::from_secs(1);
  loop {
    if last_tick.elapsed() >= Duration::from_millis(500) {
      app.tick();
      last_tick = Instant::now();
    }
    terminal.draw(|f| app.render(f, f.area()))?;

    if crossterm::event::poll(Duration::from_millis(100))? {
      if let crossterm::event::Event::Key(key) = crossterm::event::read()? {
        if matches!(key.code, crossterm::event::KeyCode::Char('q')) {
          return Ok(());
        }
      }
    }
  }
}
