pub mod filters;
pub mod seasons;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::drive_chart::{build_drive_chart, game_plays, list_drives};
use filters::{ComebackExplorer, ComebackFilter};
use seasons::SeasonCache;

#[derive(Clone)]
pub struct AppState {
    pub explorer: Arc<ComebackExplorer>,
    pub seasons: Arc<SeasonCache>,
    pub season_range: RangeInclusive<u16>,
}

type ApiError = (StatusCode, String);

/// Build the Axum router for the dashboard.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/summary", get(summary_handler))
        .route("/api/comebacks", get(comebacks_handler))
        .route("/api/seasons", get(seasons_handler))
        .route("/api/seasons/:season/weeks", get(weeks_handler))
        .route("/api/seasons/:season/games", get(games_handler))
        .route("/api/games/:game_id/drives", get(drives_handler))
        .route("/api/games/:game_id/drives/:number", get(drive_chart_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

async fn index_handler() -> impl IntoResponse {
    Html(DASHBOARD_HTML)
}

#[derive(Debug, Serialize)]
struct Summary {
    checkpoints: usize,
    seasons: usize,
    first_season: u16,
    last_season: u16,
}

/// GET /api/summary
async fn summary_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(Summary {
        checkpoints: state.explorer.len(),
        seasons: state.explorer.seasons(),
        first_season: *state.season_range.start(),
        last_season: *state.season_range.end(),
    })
}

/// GET /api/comebacks?min_deficit=17&min_game_seconds=0&include_postseason=false
async fn comebacks_handler(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<ComebackFilter>,
) -> impl IntoResponse {
    Json(state.explorer.query(filter))
}

/// GET /api/seasons
async fn seasons_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.season_range.clone().collect::<Vec<u16>>())
}

fn check_season(state: &AppState, season: u16) -> Result<(), ApiError> {
    if state.season_range.contains(&season) {
        Ok(())
    } else {
        Err((
            StatusCode::NOT_FOUND,
            format!("season {} is not available", season),
        ))
    }
}

async fn load_season(
    state: &AppState,
    season: u16,
) -> Result<Arc<Vec<crate::pbp::PlayRecord>>, ApiError> {
    check_season(state, season)?;
    state.seasons.get(season).await.map_err(|e| {
        warn!("Failed to load season {}: {:#}", season, e);
        (StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", e))
    })
}

/// GET /api/seasons/:season/weeks
async fn weeks_handler(
    State(state): State<Arc<AppState>>,
    Path(season): Path<u16>,
) -> Result<impl IntoResponse, ApiError> {
    let plays = load_season(&state, season).await?;
    let weeks: BTreeSet<u32> = plays.iter().filter_map(|p| p.week).collect();
    Ok(Json(weeks.into_iter().collect::<Vec<_>>()))
}

#[derive(Debug, Deserialize)]
struct GamesQuery {
    week: Option<u32>,
}

#[derive(Debug, Serialize)]
struct GameListing {
    game_id: String,
    home_team: Option<String>,
    away_team: Option<String>,
    week: Option<u32>,
}

/// GET /api/seasons/:season/games?week=1
async fn games_handler(
    State(state): State<Arc<AppState>>,
    Path(season): Path<u16>,
    Query(q): Query<GamesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let plays = load_season(&state, season).await?;
    let mut seen = BTreeSet::new();
    let games: Vec<GameListing> = plays
        .iter()
        .filter(|p| q.week.map_or(true, |w| p.week == Some(w)))
        .filter(|p| seen.insert(p.game_id.clone()))
        .map(|p| GameListing {
            game_id: p.game_id.clone(),
            home_team: p.home_team.clone(),
            away_team: p.away_team.clone(),
            week: p.week,
        })
        .collect();
    Ok(Json(games))
}

/// nflverse game ids start with the season: "2023_01_DET_KC".
pub fn season_of_game(game_id: &str) -> Option<u16> {
    game_id.split('_').next()?.parse().ok()
}

fn season_for(game_id: &str) -> Result<u16, ApiError> {
    season_of_game(game_id).ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            format!("malformed game id: {}", game_id),
        )
    })
}

/// GET /api/games/:game_id/drives
async fn drives_handler(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let plays = load_season(&state, season_for(&game_id)?).await?;
    let game = game_plays(&plays, &game_id);
    if game.is_empty() {
        return Err((StatusCode::NOT_FOUND, format!("no plays for {}", game_id)));
    }
    Ok(Json(list_drives(&game)))
}

/// GET /api/games/:game_id/drives/:number
async fn drive_chart_handler(
    State(state): State<Arc<AppState>>,
    Path((game_id, number)): Path<(String, usize)>,
) -> Result<impl IntoResponse, ApiError> {
    let plays = load_season(&state, season_for(&game_id)?).await?;
    let game = game_plays(&plays, &game_id);
    build_drive_chart(&game, number)
        .map(Json)
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                format!("{} has no drive {}", game_id, number),
            )
        })
}

/// Embedded single-file dashboard (HTML + CSS + JS)
const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>NFL Comebacks</title>
<style>
  :root {
    --bg: #0f1117;
    --card: #1a1d27;
    --border: #2a2d3a;
    --accent: #6c63ff;
    --field: #2e7d32;
    --red: #ff4f6a;
    --text: #e0e0e0;
    --muted: #8888aa;
  }
  * { box-sizing: border-box; margin: 0; padding: 0; }
  body { background: var(--bg); color: var(--text); font-family: 'Segoe UI', system-ui, sans-serif; }
  header { display: flex; align-items: center; gap: 1rem; padding: 1rem 2rem; border-bottom: 1px solid var(--border); }
  header h1 { font-size: 1.4rem; font-weight: 700; }
  nav button { background: none; border: 1px solid var(--border); color: var(--muted); padding: .3rem .8rem; border-radius: 6px; cursor: pointer; }
  nav button.active { border-color: var(--accent); color: var(--accent); }
  main { padding: 1.5rem 2rem; display: grid; gap: 1.5rem; }
  .panel { background: var(--card); border: 1px solid var(--border); border-radius: 10px; padding: 1rem 1.2rem; }
  .controls { display: grid; grid-template-columns: repeat(auto-fill, minmax(220px, 1fr)); gap: 1rem; align-items: end; }
  label { color: var(--muted); font-size: .8rem; text-transform: uppercase; letter-spacing: .06em; display: block; margin-bottom: .3rem; }
  input[type=range], select { width: 100%; }
  .level { font-size: 1.1rem; margin-top: .6rem; }
  svg { width: 100%; height: auto; display: block; }
  #tip { position: fixed; pointer-events: none; background: #fff; color: #000; padding: .4rem .6rem; border-radius: 4px; font-size: .8rem; white-space: pre-line; max-width: 420px; display: none; }
  .hidden { display: none; }
  .muted { color: var(--muted); font-size: .8rem; }
</style>
</head>
<body>
<header>
  <h1>🏈 NFL Comebacks</h1>
  <nav><button id="tab-cb" class="active" onclick="show('cb')">Comebacks</button> <button id="tab-dc" onclick="show('dc')">Drive chart</button></nav>
  <span class="muted" style="margin-left:auto" id="summary"></span>
</header>

<main>
  <section id="view-cb">
    <div class="panel controls">
      <div><label>Hope level (minimum comeback size): <span id="v-def"></span></label><input type="range" id="min-def" min="17" max="35" value="17"></div>
      <div><label>Clutch level (game time): <span id="v-time"></span></label><input type="range" id="min-time" min="0" max="3600" value="0"></div>
      <div><label>Win probability ceiling: <span id="v-wp"></span></label><input type="range" id="max-wp" min="0" max="100" value="100"></div>
      <div><label><input type="checkbox" id="post"> Include postseason games</label></div>
    </div>
    <div class="panel">
      <div class="level"><b>Comeback level:</b> <span id="level">…</span></div>
      <div><b id="rate">–</b> comebacks/season of this scale or greater</div>
      <svg id="scatter" viewBox="0 0 1000 420"></svg>
    </div>
  </section>

  <section id="view-dc" class="hidden">
    <div class="panel controls">
      <div><label>Season</label><select id="season"><option value="">Select a season...</option></select></div>
      <div><label>Week</label><select id="week"></select></div>
      <div><label>Game</label><select id="game"></select></div>
      <div><label>Drive</label><select id="drive"></select></div>
    </div>
    <div class="panel"><div id="drive-title" class="level"></div><svg id="field"></svg></div>
  </section>
</main>
<div id="tip"></div>

<script>
const $ = id => document.getElementById(id);
const NS = 'http://www.w3.org/2000/svg';
const tip = $('tip');
function el(tag, attrs, text) {
  const e = document.createElementNS(NS, tag);
  for (const [k, v] of Object.entries(attrs)) e.setAttribute(k, v);
  if (text !== undefined) e.textContent = text;
  return e;
}
function hover(node, text) {
  node.addEventListener('mousemove', ev => { tip.textContent = text; tip.style.display = 'block'; tip.style.left = (ev.clientX + 12) + 'px'; tip.style.top = (ev.clientY + 12) + 'px'; });
  node.addEventListener('mouseleave', () => { tip.style.display = 'none'; });
}
function gameTime(t) {
  if (t >= 3600) return 'End Reg.';
  const q = Math.floor(t / 900) + 1, rem = 900 - t % 900;
  return `Q${q} ${Math.floor(rem / 60)}:${String(rem % 60).padStart(2, '0')}`;
}
function show(view) {
  for (const v of ['cb', 'dc']) { $('view-' + v).classList.toggle('hidden', v !== view); $('tab-' + v).classList.toggle('active', v === view); }
}

async function loadSummary() {
  const r = await fetch('/api/summary');
  if (!r.ok) return;
  const s = await r.json();
  $('summary').textContent = `${s.checkpoints} checkpoints · ${s.first_season}–${s.last_season}`;
}

async function loadComebacks() {
  const def = $('min-def').value, t = $('min-time').value, wp = $('max-wp').value;
  $('v-def').textContent = def; $('v-time').textContent = gameTime(+t); $('v-wp').textContent = wp + '%';
  const q = new URLSearchParams({ min_deficit: def, min_game_seconds: t, include_postseason: $('post').checked });
  if (+wp < 100) q.set('max_win_prob', wp / 100);
  const r = await fetch('/api/comebacks?' + q);
  if (!r.ok) return;
  const res = await r.json();
  $('level').textContent = res.level;
  $('rate').textContent = res.rate.toFixed(2);
  drawScatter(res.rows, +t, +def);
}

function drawScatter(rows, t0, d0) {
  const svg = $('scatter');
  svg.innerHTML = '';
  const L = 50, R = 980, T = 10, B = 380, xMax = 4200;
  const yMax = Math.max(36, ...rows.map(r => r.max_future_deficit));
  const x = s => L + (s - t0) / (xMax - t0) * (R - L);
  const y = d => B - (d - d0 + 1) / (yMax - d0 + 1) * (B - T);
  for (let s = 0; s <= 3600; s += 300) {
    if (s < t0) continue;
    svg.appendChild(el('line', { x1: x(s), x2: x(s), y1: T, y2: B, stroke: s % 900 === 0 ? '#fff' : '#2a2d3a', 'stroke-dasharray': '4 4' }));
    svg.appendChild(el('text', { x: x(s), y: B + 18, fill: '#8888aa', 'font-size': 11, 'text-anchor': 'middle' }, gameTime(s)));
  }
  for (const r of rows) {
    const c = el('circle', { cx: x(r.deficit_end_seconds), cy: y(r.max_future_deficit), r: 5, fill: '#ff4f6a', 'fill-opacity': Math.min(1, 0.3 + (r.max_future_deficit - d0) / 20) });
    hover(c, `${r.game_id}\nOvercame ${r.max_future_deficit}-point deficit (Q${r.deficit_end_qtr} ${r.deficit_end})`);
    svg.appendChild(c);
  }
}

async function fill(select, url, toOption, placeholder) {
  select.innerHTML = `<option value="">${placeholder}</option>`;
  const r = await fetch(url);
  if (!r.ok) return;
  for (const item of await r.json()) { const [v, label] = toOption(item); select.appendChild(new Option(label, v)); }
}

async function initSeasons() {
  const r = await fetch('/api/seasons');
  if (!r.ok) return;
  for (const s of await r.json()) $('season').appendChild(new Option(s, s));
}

$('season').onchange = () => { $('game').innerHTML = ''; $('drive').innerHTML = ''; fill($('week'), `/api/seasons/${$('season').value}/weeks`, w => [w, `Week ${w}`], 'Select a week...'); };
$('week').onchange = () => { $('drive').innerHTML = ''; fill($('game'), `/api/seasons/${$('season').value}/games?week=${$('week').value}`, g => [g.game_id, `${g.away_team} @ ${g.home_team}`], 'Select a game...'); };
$('game').onchange = () => fill($('drive'), `/api/games/${$('game').value}/drives`, d => [d.number, d.label], 'Select a drive...');
$('drive').onchange = async () => {
  const r = await fetch(`/api/games/${$('game').value}/drives/${$('drive').value}`);
  if (r.ok) drawDrive(await r.json());
};

function drawDrive(c) {
  const svg = $('field');
  const [y0, y1] = c.y_range;
  svg.setAttribute('viewBox', `0 0 ${c.width} ${c.height}`);
  svg.innerHTML = '';
  const sx = c.width / (c.x_range[1] - c.x_range[0]), sy = c.height / (y1 - y0);
  const X = v => (v - c.x_range[0]) * sx, Y = v => (y1 - v) * sy;
  svg.appendChild(el('rect', { x: 0, y: 0, width: c.width, height: c.height, fill: 'var(--field)' }));
  for (const z of c.end_zones) {
    svg.appendChild(el('rect', { x: X(z.x_min), y: 0, width: (z.x_max - z.x_min) * sx, height: c.height, fill: '#1b3a6b', stroke: '#fff', 'stroke-width': 3 }));
    svg.appendChild(el('text', { x: X(z.label_x), y: Y(z.label_y), fill: '#fff', 'font-size': 32, 'font-weight': 700, 'text-anchor': 'middle', transform: `rotate(${z.text_angle} ${X(z.label_x)} ${Y(z.label_y)})` }, z.team));
  }
  for (const gx of c.grid_x) svg.appendChild(el('line', { x1: X(gx), x2: X(gx), y1: Y(c.grid_y[0]), y2: Y(c.grid_y[1]), stroke: '#fff', 'stroke-width': 1 }));
  for (const row of c.number_rows) for (const n of c.yard_numbers) svg.appendChild(el('text', { x: X(n.x), y: Y(row), fill: '#fff', 'font-size': 30, 'font-family': 'Courier New, monospace', 'text-anchor': 'middle' }, n.label));
  for (const p of c.plays) {
    if (p.start_x === null) continue;
    if (p.end_x !== null) svg.appendChild(el('line', { x1: X(p.start_x), x2: X(p.end_x), y1: Y(p.y), y2: Y(p.y), stroke: '#000', 'stroke-width': p.line_width, 'stroke-dasharray': '6 4' }));
    svg.appendChild(el('circle', { cx: X(p.start_x), cy: Y(p.y), r: 6, fill: 'orange', stroke: 'darkslategrey', 'stroke-width': 2 }));
    svg.appendChild(el('text', { x: X(p.start_x), y: Y(p.y) + 22, fill: '#fff', 'font-size': 14, 'text-anchor': 'middle' }, p.down_label));
    if (p.end_x !== null) {
      const end = el('circle', { cx: X(p.end_x), cy: Y(p.y), r: 6, fill: 'blue', stroke: 'darkslategrey', 'stroke-width': 2 });
      hover(end, p.tooltip);
      svg.appendChild(end);
      svg.appendChild(el('text', { x: X(p.end_x), y: Y(p.y) - 12, fill: '#fff', 'font-size': 20, 'text-anchor': 'middle' }, p.play_label));
    }
  }
  $('drive-title').textContent = c.title;
}

for (const id of ['min-def', 'min-time', 'max-wp']) $(id).addEventListener('input', loadComebacks);
$('post').addEventListener('change', loadComebacks);
loadSummary();
initSeasons();
loadComebacks();
</script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comebacks::ComebackRow;
    use crate::pbp::LocalFiles;
    use axum::response::Response;
    use serde_json::json;

    fn test_state() -> Arc<AppState> {
        let rows: Vec<ComebackRow> = serde_json::from_value(json!([
            {
                "year": 2022, "game_id": "2022_15_IND_MIN", "season_type": "REG",
                "total_home_score": 0, "total_away_score": 33,
                "home_score": 39, "away_score": 36,
                "max_future_deficit": 33, "deficit_end_seconds": 3300
            },
            {
                "year": 2023, "game_id": "2023_01_DET_KC", "season_type": "REG",
                "total_home_score": 7, "total_away_score": 0,
                "home_score": 20, "away_score": 21,
                "max_future_deficit": 7, "deficit_end_seconds": 1200
            }
        ]))
        .unwrap();
        Arc::new(AppState {
            explorer: Arc::new(ComebackExplorer::new(rows)),
            seasons: Arc::new(SeasonCache::new(Arc::new(LocalFiles::new("unused")), 1)),
            season_range: 2022..=2023,
        })
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_summary_body() {
        let resp = summary_handler(State(test_state())).await.into_response();
        assert_eq!(
            body_json(resp).await,
            json!({"checkpoints": 2, "seasons": 2, "first_season": 2022, "last_season": 2023})
        );
    }

    #[tokio::test]
    async fn test_comebacks_body_uses_default_filter() {
        let resp = comebacks_handler(State(test_state()), Query(ComebackFilter::default()))
            .await
            .into_response();
        let body = body_json(resp).await;
        assert_eq!(body["games"], 1);
        assert_eq!(body["seasons"], 2);
        assert_eq!(body["rate"], 0.5);
        assert_eq!(body["game_time"], "Q1 15:00");
        assert_eq!(body["filter"]["min_deficit"], 17);
        let rows = body["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["game_id"], "2022_15_IND_MIN");
        assert_eq!(rows[0]["winner_wp"], serde_json::Value::Null);
    }

    #[test]
    fn test_season_of_game() {
        assert_eq!(season_of_game("2023_01_DET_KC"), Some(2023));
        assert_eq!(season_of_game("garbage"), None);
        assert_eq!(season_of_game(""), None);
    }

    #[test]
    fn test_dashboard_html_calls_routes() {
        for route in ["/api/comebacks", "/api/summary", "/api/seasons", "/drives"] {
            assert!(DASHBOARD_HTML.contains(route), "{}", route);
        }
    }
}
