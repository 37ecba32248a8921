//! HTML templates for the web interface.
//!
//! Embedded HTML templates for the control UI.

use crate::config::Config;
use crate::eyes::{EyeSnapshot, Mood, Position};

/// Render the main control page
pub fn render_control_page(config: &Config, snapshot: &EyeSnapshot, status_message: Option<&str>) -> String {
    let status_html = status_message
        .map(|msg| format!(r#"<div class="alert">{}</div>"#, html_escape(msg)))
        .unwrap_or_default();

    let eyes = &config.eyes;
    let mood_buttons = render_mood_buttons(snapshot.mood);
    let position_grid = render_position_grid(eyes.position);

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Robo Eyes</title>
    <style>
        * {{ box-sizing: border-box; }}
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; padding: 20px; background: #f5f5f5; }}
        .container {{ max-width: 640px; margin: 0 auto; background: white; padding: 24px; border-radius: 12px; box-shadow: 0 2px 8px rgba(0,0,0,0.1); }}
        h1 {{ color: #333; margin-top: 0; }}
        h3 {{ color: #444; margin-top: 24px; margin-bottom: 12px; }}
        .status {{ background: #e3f2fd; padding: 16px; border-radius: 8px; margin-bottom: 20px; font-size: 14px; }}
        .alert {{ background: #c8e6c9; padding: 12px; border-radius: 8px; margin-bottom: 16px; color: #2e7d32; }}
        label {{ display: block; margin-top: 12px; font-weight: 600; color: #555; }}
        input, select {{ width: 100%; padding: 8px; margin-top: 4px; border: 1px solid #ddd; border-radius: 8px; font-size: 15px; }}
        .row {{ display: flex; gap: 10px; }}
        .row > div {{ flex: 1; }}
        .checkbox-group {{ display: flex; gap: 20px; margin-top: 8px; flex-wrap: wrap; }}
        .checkbox-group label {{ display: flex; align-items: center; gap: 8px; font-weight: normal; margin-top: 0; }}
        .checkbox-group input {{ width: auto; }}
        button {{ padding: 10px 16px; border: none; border-radius: 8px; font-size: 15px; cursor: pointer; font-weight: 600; background: #e0e0e0; color: #333; }}
        button.active {{ background: #2196F3; color: white; }}
        .btn-primary {{ background: #4CAF50; color: white; }}
        .inline {{ display: inline; }}
        .moods, .actions {{ display: flex; gap: 8px; flex-wrap: wrap; }}
        .actions a {{ text-decoration: none; }}
        .grid {{ display: grid; grid-template-columns: repeat(3, 1fr); gap: 6px; max-width: 240px; }}
        .grid button {{ width: 100%; }}
        hr {{ border: none; border-top: 1px solid #eee; margin: 24px 0; }}
    </style>
</head>
<body>
    <div class="container">
        <h1>Robo Eyes</h1>
        {status_html}
        <div class="status">
            <strong>Mood:</strong> {mood} &nbsp;|&nbsp; <strong>Curious:</strong> {curious} &nbsp;|&nbsp; <strong>Cyclops:</strong> {cyclops}<br>
            <strong>Left eye:</strong> {lw}&times;{lh} at ({lx}, {ly}) &nbsp;|&nbsp; <strong>Frames:</strong> {frames}<br>
            <strong>Flicker:</strong> horizontal {h_flicker}, vertical {v_flicker}
        </div>

        <h3>Mood</h3>
        <div class="moods">{mood_buttons}</div>

        <h3>Look</h3>
        <div class="grid">{position_grid}</div>

        <h3>Actions</h3>
        <div class="actions">
            <a href="/action/blink"><button type="button">Blink</button></a>
            <a href="/action/open"><button type="button">Open</button></a>
            <a href="/action/close"><button type="button">Close</button></a>
            <a href="/action/confused"><button type="button">Confused</button></a>
            <a href="/action/laugh"><button type="button">Laugh</button></a>
            <a href="/action/curious"><button type="button">Toggle Curious</button></a>
            <a href="/action/cyclops"><button type="button">Toggle Cyclops</button></a>
        </div>

        <h3>Flicker</h3>
        <form method="POST" action="/flicker">
            <div class="row">
                <div><select name="axis"><option value="h">Horizontal</option><option value="v">Vertical</option></select></div>
                <div><input type="number" name="amplitude" value="2" min="0" max="{max_flicker}"></div>
                <div class="checkbox-group"><label><input type="checkbox" name="enabled" checked> On</label></div>
                <div><button type="submit">Apply</button></div>
            </div>
        </form>

        <hr>
        <h3>Eye Settings</h3>
        <form method="POST" action="/save">
            <input type="hidden" name="mood" value="{mood}">
            <input type="hidden" name="position" value="{position}">
            <div class="row">
                <div><label>Width</label><input type="number" name="width" value="{width}" min="1" max="{max_width}"></div>
                <div><label>Height</label><input type="number" name="height" value="{height}" min="2" max="{max_height}"></div>
            </div>
            <div class="row">
                <div><label>Border radius</label><input type="number" name="border_radius" value="{border_radius}" min="0"></div>
                <div><label>Space between</label><input type="number" name="space_between" value="{space_between}"></div>
                <div><label>Frame rate</label><input type="number" name="frame_rate" value="{frame_rate}" min="1" max="100"></div>
            </div>
            <div class="checkbox-group">
                <label><input type="checkbox" name="curious" {curious_checked}> Curious</label>
                <label><input type="checkbox" name="cyclops" {cyclops_checked}> Cyclops</label>
            </div>
            <label>Auto blink (interval / variation in seconds)</label>
            <div class="row">
                <div class="checkbox-group"><label><input type="checkbox" name="autoblink" {autoblink_checked}> On</label></div>
                <div><input type="number" name="autoblink_interval" value="{autoblink_interval}" min="0" max="3600"></div>
                <div><input type="number" name="autoblink_variation" value="{autoblink_variation}" min="0" max="3600"></div>
            </div>
            <label>Idle gaze (interval / variation in seconds)</label>
            <div class="row">
                <div class="checkbox-group"><label><input type="checkbox" name="idle" {idle_checked}> On</label></div>
                <div><input type="number" name="idle_interval" value="{idle_interval}" min="0" max="3600"></div>
                <div><input type="number" name="idle_variation" value="{idle_variation}" min="0" max="3600"></div>
            </div>
            <div class="actions" style="margin-top: 20px;">
                <button type="submit" class="btn-primary">Save &amp; Apply</button>
                <a href="/state"><button type="button">State JSON</button></a>
            </div>
        </form>
    </div>
</body>
</html>"##,
        status_html = status_html,
        mood = snapshot.mood,
        curious = on_off(snapshot.curious),
        cyclops = on_off(snapshot.cyclops),
        lw = snapshot.left.width,
        lh = snapshot.left.height,
        lx = snapshot.left.x,
        ly = snapshot.left.y,
        frames = snapshot.frames,
        h_flicker = on_off(snapshot.h_flicker),
        v_flicker = on_off(snapshot.v_flicker),
        max_flicker = super::routes::MAX_FLICKER_AMPLITUDE,
        mood_buttons = mood_buttons,
        position_grid = position_grid,
        position = eyes.position,
        width = eyes.width,
        height = eyes.height,
        max_width = config.display.width,
        max_height = config.display.height,
        border_radius = eyes.border_radius,
        space_between = eyes.space_between,
        frame_rate = eyes.frame_rate,
        curious_checked = checked_if(eyes.curious),
        cyclops_checked = checked_if(eyes.cyclops),
        autoblink_checked = checked_if(eyes.autoblink.enabled),
        autoblink_interval = eyes.autoblink.interval_s,
        autoblink_variation = eyes.autoblink.variation_s,
        idle_checked = checked_if(eyes.idle.enabled),
        idle_interval = eyes.idle.interval_s,
        idle_variation = eyes.idle.variation_s,
    )
}

/// One form button per mood, the current one highlighted
fn render_mood_buttons(current: Mood) -> String {
    Mood::all()
        .iter()
        .map(|mood| {
            format!(
                r#"<form class="inline" method="POST" action="/mood"><button name="mood" value="{name}" class="{class}">{name}</button></form>"#,
                name = mood,
                class = active_if(*mood == current),
            )
        })
        .collect()
}

/// 3x3 grid of gaze buttons in compass layout
fn render_position_grid(current: Position) -> String {
    Position::all()
        .iter()
        .map(|position| {
            format!(
                r#"<form method="POST" action="/position"><button name="position" value="{name}" class="{class}">{label}</button></form>"#,
                name = position.short_name(),
                class = active_if(*position == current),
                label = position.short_name().to_uppercase(),
            )
        })
        .collect()
}

/// Render a simple message page
pub fn render_message_page(title: &str, message: &str, back_link: bool) -> String {
    let back_html = if back_link {
        r#"<p><a href="/">← Back to controls</a></p>"#
    } else {
        ""
    };

    format!(
        r#"<!DOCTYPE html>
<html><head><meta charset="UTF-8"><title>{title}</title>
<style>body{{font-family:sans-serif;padding:20px;}}
.msg{{background:#e3f2fd;padding:20px;border-radius:8px;max-width:500px;}}
a{{color:#2196F3;}}</style></head>
<body><div class="msg"><h2>{title}</h2><p>{message}</p>{back_html}</div></body></html>"#,
        title = title,
        message = message,
        back_html = back_html,
    )
}

fn checked_if(condition: bool) -> &'static str {
    if condition { "checked" } else { "" }
}

fn active_if(condition: bool) -> &'static str {
    if condition { "active" } else { "" }
}

pub fn on_off(condition: bool) -> &'static str {
    if condition { "on" } else { "off" }
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
