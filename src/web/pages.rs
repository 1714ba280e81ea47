// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Server-rendered dashboard pages

use axum::{
    extract::{Query, State},
    response::Html,
};
use std::sync::Arc;

use super::{ApiResult, AppState, UserQuery};
use crate::analysis::{analyze_mood_patterns, calculate_wellness_score, predict_stress_level, StressPrediction};
use crate::coaching::{CoachingSession, CopingStrategy, PERSONAS};
use crate::garden::{MeditationStats, ZenGarden};
use crate::journal::JournalEntry;
use crate::privacy::privacy_summary;
use crate::timeline;
use crate::wearable::devices;
use crate::wearable::ProcessedWearable;

const RECENT_ENTRIES: usize = 5;

// === Page Handlers ===

pub(super) async fn index_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Html<String>> {
    let user = query.resolve(&state.config);
    let today = state.today();
    let data = state.store.load(&user, today)?;

    let prediction = predict_stress_level(data.journal_entries.last(), data.wearable_data.last());
    let dashboard = Dashboard {
        wellness: data.wearable_data.last().map(calculate_wellness_score),
        prediction: &prediction,
        journal_streak: timeline::streak_days(&data.journal_entries, today),
        meditation: data.garden.meditation_stats(today),
        entry_count: data.journal_entries.len(),
    };
    Ok(Html(render_index(&user, &dashboard, &data.journal_entries)))
}

pub(super) async fn journal_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Html<String>> {
    let user = query.resolve(&state.config);
    let data = state.store.load(&user, state.today())?;
    Ok(Html(render_journal_page(&user, &data.journal_entries)))
}

pub(super) async fn wearables_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Html<String>> {
    let user = query.resolve(&state.config);
    let data = state.store.load(&user, state.today())?;
    Ok(Html(render_wearables_page(
        &user,
        &data.wearable_data,
        &state.config.wearable.default_device,
    )))
}

pub(super) async fn insights_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Html<String>> {
    let user = query.resolve(&state.config);
    let data = state.store.load(&user, state.today())?;
    let insights = analyze_mood_patterns(&data.journal_entries, &data.wearable_data);
    Ok(Html(render_insights_page(&user, &insights, &data.journal_entries)))
}

pub(super) async fn strategies_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Html<String>> {
    let user = query.resolve(&state.config);
    let data = state.store.load(&user, state.today())?;
    Ok(Html(render_strategies_page(&user, &data.coping_strategies)))
}

pub(super) async fn coaching_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Html<String>> {
    let user = query.resolve(&state.config);
    let data = state.store.load(&user, state.today())?;
    Ok(Html(render_coaching_page(
        &user,
        &data.coaching_history,
        state.coach.is_online(),
    )))
}

pub(super) async fn garden_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Html<String>> {
    let user = query.resolve(&state.config);
    let today = state.today();
    let data = state.store.load(&user, today)?;
    let stats = data.garden.meditation_stats(today);
    Ok(Html(render_garden_page(&user, &data.garden, &stats)))
}

pub(super) async fn privacy_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> Html<String> {
    let user = query.resolve(&state.config);
    Html(render_privacy_page(&user))
}

// === Template Rendering ===

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// JSON string literal that cannot close an inline `<script>`
fn script_string(text: &str) -> String {
    serde_json::to_string(text)
        .unwrap_or_else(|_| "\"\"".to_string())
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

fn base_template(title: &str, user: &str, content: &str) -> String {
    let user_query = urlencoding::encode(user);
    let user = escape(user);
    format!(r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - NeuroSync</title>
    <style>
        :root {{
            --bg-primary: #f5f7fb;
            --bg-secondary: #ffffff;
            --bg-card: #ffffff;
            --text-primary: #1f2937;
            --text-secondary: #6b7280;
            --accent: #4361ee;
            --accent-soft: #e0e7ff;
            --success: #10b981;
            --warning: #f59e0b;
            --border: #e5e7eb;
        }}
        * {{ box-sizing: border-box; margin: 0; padding: 0; }}
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: var(--bg-primary);
            color: var(--text-primary);
            line-height: 1.6;
        }}
        .container {{ max-width: 1200px; margin: 0 auto; padding: 20px; }}
        nav {{
            background: var(--bg-secondary);
            padding: 15px 20px;
            display: flex;
            align-items: center;
            gap: 24px;
            border-bottom: 1px solid var(--border);
        }}
        nav .logo {{
            font-size: 1.5em;
            font-weight: bold;
            color: var(--accent);
            text-decoration: none;
        }}
        nav a {{ color: var(--text-secondary); text-decoration: none; }}
        nav a:hover {{ color: var(--text-primary); }}
        nav .user {{ margin-left: auto; color: var(--text-secondary); font-size: 0.9em; }}
        h1 {{ margin: 10px 0 20px; }}
        .card {{
            background: var(--bg-card);
            border: 1px solid var(--border);
            border-radius: 12px;
            padding: 20px;
            margin-bottom: 20px;
        }}
        .card h2 {{ margin-bottom: 15px; color: var(--accent); }}
        .stats-grid {{
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
            gap: 20px;
            margin-bottom: 30px;
        }}
        .stat-card {{
            background: var(--bg-card);
            border: 1px solid var(--border);
            border-radius: 12px;
            padding: 20px;
            text-align: center;
        }}
        .stat-card .number {{ font-size: 2.2em; font-weight: bold; color: var(--accent); }}
        .stat-card .label {{ color: var(--text-secondary); font-size: 0.9em; }}
        table {{ width: 100%; border-collapse: collapse; }}
        th, td {{ padding: 10px; text-align: left; border-bottom: 1px solid var(--border); }}
        th {{ color: var(--text-secondary); font-weight: 500; }}
        .tag {{
            display: inline-block;
            background: var(--accent-soft);
            color: var(--accent);
            padding: 2px 8px;
            border-radius: 12px;
            font-size: 0.8em;
            margin: 2px;
        }}
        .markdown {{ white-space: pre-wrap; font-family: inherit; }}
        .muted {{ color: var(--text-secondary); }}
        form label {{ display: block; margin: 8px 0 4px; }}
        form input, form textarea, form select {{ width: 100%; padding: 8px; border: 1px solid var(--border); border-radius: 6px; }}
        form button {{ margin-top: 12px; padding: 8px 16px; background: var(--accent); color: white; border: none; border-radius: 6px; }}
        .garden {{ position: relative; height: 320px; background: #efe6d2; border-radius: 12px; overflow: hidden; }}
        .garden span {{ position: absolute; transform: translate(-50%, -50%); font-size: 0.8em; }}
    </style>
</head>
<body>
    <nav>
        <a href="/?user={user_query}" class="logo">NeuroSync</a>
        <a href="/?user={user_query}">Dashboard</a>
        <a href="/journal?user={user_query}">Journal</a>
        <a href="/wearables?user={user_query}">Wearables</a>
        <a href="/insights?user={user_query}">Insights</a>
        <a href="/strategies?user={user_query}">Strategies</a>
        <a href="/coaching?user={user_query}">Coaching</a>
        <a href="/garden?user={user_query}">Zen Garden</a>
        <a href="/privacy?user={user_query}">Privacy</a>
        <span class="user">{user}</span>
    </nav>
    <main class="container">
        {content}
    </main>
</body>
</html>"#)
}

struct Dashboard<'a> {
    wellness: Option<u8>,
    prediction: &'a StressPrediction,
    journal_streak: u32,
    meditation: MeditationStats,
    entry_count: usize,
}

fn stat(number: impl std::fmt::Display, label: &str) -> String {
    format!(
        r#"<div class="stat-card"><div class="number">{}</div><div class="label">{}</div></div>"#,
        number, label
    )
}

fn render_index(user: &str, dashboard: &Dashboard<'_>, entries: &[JournalEntry]) -> String {
    let wellness = dashboard
        .wellness
        .map_or_else(|| "-".to_string(), |w| w.to_string());

    let stats_html = [
        stat(wellness, "Wellness Score"),
        stat(format!("{}/10", dashboard.prediction.predicted_stress_level), "Predicted Stress"),
        stat(format!("{} days", dashboard.journal_streak), "Journal Streak"),
        stat(format!("{} days", dashboard.meditation.streak_days), "Meditation Streak"),
        stat(dashboard.entry_count, "Journal Entries"),
    ]
    .concat();

    let factors: String = dashboard
        .prediction
        .contributing_factors
        .iter()
        .map(|f| format!("<tr><td>{}</td><td>{}</td></tr>", escape(&f.factor), escape(&f.impact)))
        .collect();

    let recommendations: String = dashboard
        .prediction
        .recommendations
        .iter()
        .map(|r| format!("<li>{}</li>", escape(r)))
        .collect();

    let recent: Vec<JournalEntry> = entries.iter().rev().take(RECENT_ENTRIES).cloned().collect();

    let content = format!(r#"
        <h1>Dashboard</h1>
        <div class="stats-grid">{}</div>
        <div style="display: grid; grid-template-columns: 1fr 1fr; gap: 20px;">
            <div class="card">
                <h2>Stress Factors</h2>
                <table>
                    <tr><th>Factor</th><th>Impact</th></tr>
                    {}
                </table>
            </div>
            <div class="card">
                <h2>Recommendations</h2>
                <ul>{}</ul>
            </div>
        </div>
        <div class="card">
            <h2>Recent Journal Entries</h2>
            {}
        </div>
    "#, stats_html, factors, recommendations, render_journal_table(&recent));

    base_template("Dashboard", user, &content)
}

fn render_journal_table(entries: &[JournalEntry]) -> String {
    if entries.is_empty() {
        return r#"<p class="muted">No journal entries yet.</p>"#.to_string();
    }

    let rows: String = entries
        .iter()
        .map(|e| {
            let emotions: String = e
                .detected_emotions
                .keys()
                .map(|emotion| format!(r#"<span class="tag">{}</span>"#, emotion.as_str()))
                .collect();
            format!(
                "<tr><td>{}</td><td><strong>{}</strong><br><span class=\"markdown\">{}</span></td><td>{}</td><td>{}</td><td>{:.2}</td><td>{}</td></tr>",
                timeline::format_date(e.date),
                escape(&e.title),
                escape(&e.content),
                e.mood_score,
                e.stress_level,
                e.sentiment.compound,
                emotions
            )
        })
        .collect();

    format!(r#"
        <table>
            <tr>
                <th>Date</th>
                <th>Entry</th>
                <th>Mood</th>
                <th>Stress</th>
                <th>Sentiment</th>
                <th>Emotions</th>
            </tr>
            {}
        </table>
    "#, rows)
}

fn render_journal_page(user: &str, entries: &[JournalEntry]) -> String {
    let newest_first: Vec<JournalEntry> = entries.iter().rev().cloned().collect();
    let user_js = script_string(user);

    let content = format!(r#"
        <h1>Journal</h1>
        <div class="card">
            <h2>New Entry</h2>
            <form id="journal-form">
                <label>Date</label><input type="date" name="date" required>
                <label>Title</label><input name="entry_title">
                <label>How are you feeling?</label><textarea name="content" rows="5" required></textarea>
                <label>Mood (1-10)</label><input type="number" name="mood_score" min="1" max="10" value="5">
                <label>Stress (1-10)</label><input type="number" name="stress_level" min="1" max="10" value="5">
                <label>Sleep quality (1-10)</label><input type="number" name="sleep_quality" min="1" max="10" value="5">
                <label><input type="checkbox" name="exercise" style="width:auto"> Exercise</label>
                <label><input type="checkbox" name="meditation" style="width:auto"> Meditation</label>
                <label><input type="checkbox" name="social_interaction" style="width:auto"> Social interaction</label>
                <label><input type="checkbox" name="outdoor_time" style="width:auto"> Time outdoors</label>
                <button type="submit">Save Entry</button>
            </form>
        </div>
        <div class="card">
            <h2>Entries</h2>
            {}
        </div>
        <script>
            const user = {};
            document.getElementById('journal-form').addEventListener('submit', async (event) => {{
                event.preventDefault();
                const f = event.target;
                const body = {{
                    date: f.date.value,
                    title: f.entry_title.value,
                    content: f.content.value,
                    mood_score: Number(f.mood_score.value),
                    stress_level: Number(f.stress_level.value),
                    sleep_quality: Number(f.sleep_quality.value),
                    activities: {{
                        exercise: f.exercise.checked,
                        meditation: f.meditation.checked,
                        social_interaction: f.social_interaction.checked,
                        outdoor_time: f.outdoor_time.checked,
                    }},
                }};
                const res = await fetch(`/api/users/${{encodeURIComponent(user)}}/journal`, {{
                    method: 'POST',
                    headers: {{ 'Content-Type': 'application/json' }},
                    body: JSON.stringify(body),
                }});
                if (res.ok) {{ location.reload(); }} else {{ alert((await res.json()).error); }}
            }});
        </script>
    "#, render_journal_table(&newest_first), user_js);

    base_template("Journal", user, &content)
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.0}", v))
}

fn render_wearables_page(user: &str, records: &[ProcessedWearable], default_device: &str) -> String {
    let rows: String = records
        .iter()
        .rev()
        .map(|w| {
            let m = &w.metrics;
            format!(
                "<tr><td>{}</td><td>{:.0}</td><td>{}</td><td>{:.1}</td><td>{:.0}%</td><td>{}</td><td>{:.0}</td><td>{}</td><td>{}</td></tr>",
                timeline::format_date(w.date),
                m.avg_heart_rate,
                w.heart_rate_range.map_or("-", |r| r.as_str()),
                m.sleep_hours,
                w.sleep_efficiency,
                m.steps,
                m.activity_minutes,
                fmt_opt(m.stress_score),
                w.wellness_score.map_or_else(|| "-".to_string(), |s| s.to_string()),
            )
        })
        .collect();

    let device_options: String = devices::device_list()
        .into_iter()
        .map(|d| {
            let selected = if d == default_device { " selected" } else { "" };
            format!(r#"<option{}>{}</option>"#, selected, escape(d))
        })
        .collect();
    let user_js = script_string(user);

    let content = format!(r#"
        <h1>Wearables</h1>
        <div class="card">
            <h2>Sync Device</h2>
            <p class="muted">Device data is simulated.</p>
            <form id="sync-form">
                <label>Device</label><select name="device">{}</select>
                <label>Days</label><input type="number" name="days" min="1" max="90" value="7">
                <button type="submit">Import Data</button>
            </form>
        </div>
        <div class="card">
            <h2>Health Data</h2>
            <table>
                <tr>
                    <th>Date</th><th>Avg HR</th><th>Range</th><th>Sleep (h)</th><th>Sleep Efficiency</th>
                    <th>Steps</th><th>Active Min</th><th>Stress</th><th>Wellness</th>
                </tr>
                {}
            </table>
        </div>
        <script>
            const user = {};
            document.getElementById('sync-form').addEventListener('submit', async (event) => {{
                event.preventDefault();
                const f = event.target;
                const res = await fetch(`/api/users/${{encodeURIComponent(user)}}/wearables/sync`, {{
                    method: 'POST',
                    headers: {{ 'Content-Type': 'application/json' }},
                    body: JSON.stringify({{ device: f.device.value, days: Number(f.days.value) }}),
                }});
                if (res.ok) {{ location.reload(); }} else {{ alert((await res.json()).error); }}
            }});
        </script>
    "#, device_options, rows, user_js);

    base_template("Wearables", user, &content)
}

fn render_insights_page(user: &str, insights: &[String], entries: &[JournalEntry]) -> String {
    let items: String = insights
        .iter()
        .map(|i| format!("<li>{}</li>", escape(i)))
        .collect();

    let trend: String = entries
        .iter()
        .rev()
        .take(14)
        .map(|e| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                timeline::format_date(e.date),
                e.mood_score,
                e.stress_level,
                e.sleep_quality,
                escape(&e.activities.describe())
            )
        })
        .collect();

    let content = format!(r#"
        <h1>Insights</h1>
        <div class="card">
            <h2>Mood Patterns</h2>
            <ul>{}</ul>
        </div>
        <div class="card">
            <h2>Last Two Weeks</h2>
            <table>
                <tr><th>Date</th><th>Mood</th><th>Stress</th><th>Sleep</th><th>Activities</th></tr>
                {}
            </table>
        </div>
    "#, items, trend);

    base_template("Insights", user, &content)
}

fn render_strategies_page(user: &str, strategies: &[CopingStrategy]) -> String {
    let cards: String = strategies
        .iter()
        .rev()
        .map(|s| {
            let areas: String = s
                .focus_areas
                .iter()
                .map(|a| format!(r#"<span class="tag">{}</span>"#, escape(a)))
                .collect();
            format!(
                r#"<div class="card"><p class="muted">{} {}</p><div class="markdown">{}</div></div>"#,
                timeline::format_date(s.date),
                areas,
                escape(&s.strategy)
            )
        })
        .collect();

    let content = format!(r#"
        <h1>Coping Strategies</h1>
        <p class="muted">Request new strategies with <code>POST /api/users/&lt;user&gt;/strategies</code>.</p>
        {}
    "#, cards);

    base_template("Strategies", user, &content)
}

fn render_coaching_page(user: &str, sessions: &[CoachingSession], online: bool) -> String {
    let personas: String = PERSONAS
        .iter()
        .map(|p| format!("<tr><td><strong>{}</strong></td><td>{}</td></tr>", p.name, p.description))
        .collect();

    let history: String = sessions
        .iter()
        .rev()
        .map(|s| {
            let messages: String = s
                .messages
                .iter()
                .map(|m| {
                    format!(
                        r#"<p><strong>{}:</strong></p><div class="markdown">{}</div>"#,
                        escape(&m.role),
                        escape(&m.content)
                    )
                })
                .collect();
            format!(
                r#"<div class="card"><h2>{}</h2><p class="muted">{} with {}</p>{}</div>"#,
                escape(&s.focus),
                timeline::format_date(s.date),
                escape(&s.persona_name),
                messages
            )
        })
        .collect();

    let status = if online {
        "Language model connected."
    } else {
        "No language model configured; coaching uses built-in guidance."
    };

    let content = format!(r#"
        <h1>AI Coaching</h1>
        <p class="muted">{}</p>
        <div class="card">
            <h2>Coaches</h2>
            <table>{}</table>
        </div>
        {}
    "#, status, personas, history);

    base_template("Coaching", user, &content)
}

fn render_garden_page(user: &str, garden: &ZenGarden, stats: &MeditationStats) -> String {
    let marker = |x: u8, y: u8, label: &str| {
        format!(r#"<span style="left: {}%; top: {}%;">{}</span>"#, x, y, label)
    };
    let items: String = garden
        .stones
        .iter()
        .map(|s| marker(s.x, s.y, "stone"))
        .chain(garden.plants.iter().map(|p| marker(p.x, p.y, "plant")))
        .chain(garden.decorations.iter().map(|d| marker(d.x, d.y, "decoration")))
        .collect();

    let last_session = stats
        .last_session
        .map_or_else(|| "never".to_string(), timeline::format_date);
    let user_js = script_string(user);

    let content = format!(r#"
        <h1>Zen Garden</h1>
        <div class="stats-grid">{}</div>
        <div class="card">
            <h2>Your Garden</h2>
            <p class="muted">Sand pattern: {}. Last tended {}.</p>
            <div class="garden">{}</div>
        </div>
        <div class="card">
            <h2>Log Meditation</h2>
            <p class="muted">Last session: {}</p>
            <form id="meditation-form">
                <label>Minutes</label><input type="number" name="minutes" min="1" value="10">
                <label>Notes</label><input name="notes">
                <button type="submit">Record Session</button>
            </form>
        </div>
        <script>
            const user = {};
            document.getElementById('meditation-form').addEventListener('submit', async (event) => {{
                event.preventDefault();
                const f = event.target;
                const res = await fetch(`/api/users/${{encodeURIComponent(user)}}/garden/sessions`, {{
                    method: 'POST',
                    headers: {{ 'Content-Type': 'application/json' }},
                    body: JSON.stringify({{ duration_minutes: Number(f.minutes.value), notes: f.notes.value }}),
                }});
                if (res.ok) {{ location.reload(); }} else {{ alert((await res.json()).error); }}
            }});
        </script>
    "#,
        [
            stat(stats.total_sessions, "Sessions"),
            stat(stats.total_minutes, "Total Minutes"),
            stat(stats.longest_session, "Longest Session"),
            stat(format!("{:.1}", stats.average_duration), "Average Minutes"),
            stat(format!("{} days", stats.streak_days), "Streak"),
        ]
        .concat(),
        garden.sand_pattern.as_str(),
        timeline::format_date(garden.last_modified),
        items,
        last_session,
        user_js,
    );

    base_template("Zen Garden", user, &content)
}

fn render_privacy_page(user: &str) -> String {
    let content = format!(r#"
        <h1>Privacy</h1>
        <div class="card">
            <div class="markdown">{}</div>
        </div>
        <div class="card">
            <h2>Your Data</h2>
            <p><a href="/api/users/{}/export">Download a copy of your data</a></p>
        </div>
    "#, escape(privacy_summary()), urlencoding::encode(user));

    base_template("Privacy", user, &content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<a href="x">Tom & 'Jerry'</a>"#), "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;");
    }

    #[test]
    fn test_nav_carries_user() {
        let html = base_template("Test", "sam", "<p>body</p>");
        assert!(html.contains(r#"href="/journal?user=sam""#));
        assert!(html.contains("<title>Test - NeuroSync</title>"));
    }

    #[test]
    fn test_nav_encodes_user() {
        let html = base_template("Test", "a&b #1", "");
        assert!(html.contains(r#"href="/garden?user=a%26b%20%231""#));
        assert!(html.contains(r#"<span class="user">a&amp;b #1</span>"#));
    }

    #[test]
    fn test_script_string_cannot_close_tag() {
        let js = script_string("</script><b>&");
        assert_eq!(js, r#""\u003c/script\u003e\u003cb\u003e\u0026""#);
        assert!(!js.contains('<'));
    }

    #[test]
    fn test_empty_journal_table() {
        assert!(render_journal_table(&[]).contains("No journal entries yet."));
    }
}
