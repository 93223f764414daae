//! Server-side rendering of the calculator page.

use std::fmt::Write;

use co2calc_core::{EmissionsForm, EmissionsResult, FuelType};

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>CO2 Footprint Calculator</title>
    <style>
        body {
            font-family: Arial, sans-serif;
            max-width: 640px;
            margin: 50px auto;
            padding: 20px;
            background: #f5f5f5;
        }
        .container {
            background: white;
            padding: 30px;
            border-radius: 8px;
            box-shadow: 0 2px 4px rgba(0,0,0,0.1);
        }
        h1 {
            color: #333;
            border-bottom: 3px solid #4CAF50;
            padding-bottom: 10px;
        }
        label {
            display: block;
            margin-top: 12px;
        }
        input, select {
            width: 100%;
            padding: 6px;
            box-sizing: border-box;
        }
        button {
            margin-top: 20px;
            padding: 8px 16px;
        }
        .result {
            margin-top: 20px;
            padding: 10px;
            background: #f9f9f9;
            border-left: 4px solid #4CAF50;
        }
        .error {
            margin-top: 20px;
            padding: 10px;
            background: #fdecea;
            border-left: 4px solid #e53935;
        }
    </style>
</head>
<body>
    <div class="container">
        <h1>CO2 Footprint Calculator</h1>
"#;

const PAGE_TAIL: &str = r#"    </div>
</body>
</html>
"#;

/// What the page shows besides the empty form.
#[derive(Debug, Default, Clone, Copy)]
pub struct PageView<'a> {
    /// Values to refill the inputs with.
    pub form: Option<&'a EmissionsForm>,
    pub result: Option<&'a EmissionsResult>,
    pub error: Option<&'a str>,
}

impl<'a> PageView<'a> {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_result(form: &'a EmissionsForm, result: &'a EmissionsResult) -> Self {
        Self {
            form: Some(form),
            result: Some(result),
            error: None,
        }
    }

    pub fn with_error(form: &'a EmissionsForm, error: &'a str) -> Self {
        Self {
            form: Some(form),
            result: None,
            error: Some(error),
        }
    }
}

pub fn render_page(view: &PageView<'_>) -> String {
    let mut html = String::with_capacity(PAGE_HEAD.len() + 4096);
    html.push_str(PAGE_HEAD);
    render_form(&mut html, view.form);

    if let Some(error) = view.error {
        let _ = writeln!(
            html,
            "        <p class=\"error\">{}</p>",
            escape_html(error)
        );
    }
    if let Some(result) = view.result {
        render_result(&mut html, result);
    }

    html.push_str(PAGE_TAIL);
    html
}

fn render_form(html: &mut String, form: Option<&EmissionsForm>) {
    let echo = |raw: Option<&String>| raw.map(|value| escape_html(value)).unwrap_or_default();
    let selected_fuel = form.and_then(|form| form.fuel_type.as_deref());

    html.push_str("        <form method=\"post\" action=\"/\">\n");
    number_input(
        html,
        "distance",
        "Distance traveled (km)",
        "any",
        &echo(form.and_then(|f| f.distance.as_ref())),
    );
    number_input(
        html,
        "fuel_efficiency",
        "Fuel efficiency (km per liter)",
        "any",
        &echo(form.and_then(|f| f.fuel_efficiency.as_ref())),
    );

    html.push_str("            <label for=\"fuel_type\">Fuel type</label>\n");
    html.push_str("            <select id=\"fuel_type\" name=\"fuel_type\">\n");
    for fuel in FuelType::KNOWN {
        let selected = if selected_fuel == Some(fuel.as_str()) {
            " selected"
        } else {
            ""
        };
        let _ = writeln!(
            html,
            "                <option value=\"{}\"{}>{}</option>",
            fuel.as_str(),
            selected,
            fuel.label()
        );
    }
    if let Some(name) = selected_fuel.filter(|name| FuelType::from_name(name) == FuelType::Unknown) {
        let _ = writeln!(
            html,
            "                <option value=\"{}\" selected>{}</option>",
            escape_html(name),
            FuelType::Unknown.label()
        );
    }
    html.push_str("            </select>\n");

    number_input(
        html,
        "meat_consumption",
        "Meat consumption (kg)",
        "any",
        &echo(form.and_then(|f| f.meat_consumption.as_ref())),
    );
    number_input(
        html,
        "lightbulbs",
        "Incandescent lightbulbs in use",
        "1",
        &echo(form.and_then(|f| f.lightbulbs.as_ref())),
    );
    html.push_str("            <button type=\"submit\">Calculate</button>\n");
    html.push_str("        </form>\n");
}

fn number_input(html: &mut String, name: &str, label: &str, step: &str, value: &str) {
    let _ = writeln!(html, "            <label for=\"{name}\">{label}</label>");
    let _ = writeln!(
        html,
        "            <input type=\"number\" id=\"{name}\" name=\"{name}\" step=\"{step}\" value=\"{value}\" required>"
    );
}

fn render_result(html: &mut String, result: &EmissionsResult) {
    let breakdown = &result.breakdown;
    html.push_str("        <div class=\"result\">\n");
    let _ = writeln!(
        html,
        "            <p>Estimated emissions: <strong>{:.2} kg CO2</strong></p>",
        result.emissions
    );
    html.push_str("            <ul>\n");
    let _ = writeln!(
        html,
        "                <li>Travel ({}): {:.2} kg CO2</li>",
        result.fuel_type.label(),
        breakdown.travel
    );
    let _ = writeln!(
        html,
        "                <li>Meat: {:.2} kg CO2</li>",
        breakdown.meat
    );
    let _ = writeln!(
        html,
        "                <li>Lightbulbs: {:.2} kg CO2</li>",
        breakdown.lightbulb
    );
    html.push_str("            </ul>\n");
    html.push_str("        </div>\n");
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}
