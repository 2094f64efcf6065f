use std::fmt::Write;

use crate::pipeline::{Prediction, RiskLabel};
use crate::record::{
	FamilyHistory, PatientRecord, ADIPOSITY_RANGE, AGE_RANGE, LDL_RANGE, OBESITY_RANGE, SBP_RANGE,
};

/// What to show under the form after a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
	Predicted(Prediction),
	/// The submitted values failed the form's bounds.
	Rejected(String),
	/// The model could not be loaded or applied.
	Failed(String),
}

const STYLE: &str = r#"
body { background-color: #eef3f8; font-family: sans-serif; color: #2c4a63; }
.main { background-color: #ffffff; max-width: 760px; margin: 2rem auto; padding: 2rem 3rem;
	border-radius: 12px; box-shadow: 0 2px 15px rgba(0,0,0,0.1); }
.header { background-color: #d3e3fc; padding: 25px; border-radius: 12px; text-align: center;
	margin-bottom: 20px; border-left: 6px solid #4a90e2; }
.header h1 { font-size: 30px; margin: 0; font-weight: 700; }
.header p { color: #436280; font-size: 15px; margin-top: 5px; }
.columns { display: grid; grid-template-columns: 1fr 1fr; gap: 1rem 2rem; }
label { display: block; font-weight: 600; margin-bottom: 0.3rem; }
input, select { width: 100%; box-sizing: border-box; padding: 0.4rem; border-radius: 8px;
	border: 1px solid #bcd0e7; background-color: #f7fbff; }
button { margin-top: 1.2rem; background-color: #4a90e2; color: white; padding: 0.6rem 1.2rem;
	border-radius: 8px; border: none; font-size: 15px; }
button:hover { background-color: #3d7bc4; }
table { border-collapse: collapse; width: 100%; }
th, td { border: 1px solid #bcd0e7; padding: 0.3rem 0.6rem; text-align: right; }
.notice { padding: 1rem; border-radius: 8px; margin: 1rem 0; }
.high, .error { background-color: #fde8e8; color: #8a1f1f; }
.low { background-color: #e6f6ea; color: #1f6b35; }
.info { background-color: #e8f1fd; color: #24527a; }
"#;

pub fn render(record: &PatientRecord, outcome: Option<&Outcome>) -> String {
	let mut html = String::new();

	// Writing into a String cannot fail
	let _ = write!(
		html,
		r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Heart disease risk prediction</title>
<style>{STYLE}</style>
</head>
<body>
<div class="main">
<div class="header">
<h1>🩺 Heart disease risk prediction</h1>
<p>Automatic analysis based on a machine learning model.</p>
</div>
<h3>🔍 Patient clinical parameters</h3>
<form method="post" action="/">
<div class="columns">
<div>
{age}
{sbp}
{ldl}
</div>
<div>
{adiposity}
{obesity}
{famhist}
</div>
</div>
<button type="submit">Analyze risk</button>
</form>
"#,
		age = number_input("age", "Age", record.age as f64, (AGE_RANGE.0 as f64, AGE_RANGE.1 as f64), "1"),
		sbp = number_input("sbp", "Systolic blood pressure (mmHg)", record.sbp, SBP_RANGE, "0.01"),
		ldl = number_input("ldl", "LDL cholesterol (mmol/L)", record.ldl, LDL_RANGE, "0.01"),
		adiposity = number_input("adiposity", "Adiposity", record.adiposity, ADIPOSITY_RANGE, "0.01"),
		obesity = number_input("obesity", "Obesity", record.obesity, OBESITY_RANGE, "0.01"),
		famhist = family_history_select(record.famhist),
	);

	match outcome {
		Some(Outcome::Predicted(prediction)) => {
			html.push_str(&entered_data(record));
			html.push_str(&result(prediction));
		},
		Some(Outcome::Rejected(message)) => {
			let _ = write!(html, r#"<div class="notice error">Invalid input: {}</div>"#, escape(message));
		},
		Some(Outcome::Failed(message)) => {
			let _ = write!(html, r#"<div class="notice error">Analysis failed: {}</div>"#, escape(message));
		},
		None => {},
	}

	html.push_str("</div>\n</body>\n</html>\n");
	html
}

fn number_input(name: &str, label: &str, value: f64, (min, max): (f64, f64), step: &str) -> String {
	format!(
		r#"<label for="{name}">{label}</label>
<input type="number" id="{name}" name="{name}" min="{min}" max="{max}" step="{step}" value="{value}" required>"#
	)
}

fn family_history_select(selected: FamilyHistory) -> String {
	let options = FamilyHistory::ALL
		.iter()
		.map(|f| {
			let attr = if *f == selected { " selected" } else { "" };
			format!(r#"<option value="{f}"{attr}>{f}</option>"#)
		})
		.collect::<String>();

	format!(r#"<label for="famhist">Family history</label>
<select id="famhist" name="famhist">{options}</select>"#)
}

fn entered_data(record: &PatientRecord) -> String {
	let header = PatientRecord::columns()
		.iter()
		.map(|c| format!("<th>{c}</th>"))
		.collect::<String>();
	let cells = record
		.cells()
		.iter()
		.map(|c| format!("<td>{}</td>", escape(c)))
		.collect::<String>();

	format!("<h3>📄 Entered data</h3>\n<table><tr>{header}</tr><tr>{cells}</tr></table>\n")
}

fn result(prediction: &Prediction) -> String {
	let (class, text) = match prediction.label {
		RiskLabel::High => ("high", "⚠️ High risk detected."),
		RiskLabel::Low => ("low", "🟢 Low risk detected."),
	};

	format!(
		r#"<h3>🧪 Analysis result</h3>
<div class="notice {class}">{text}<br>Estimated probability: <strong>{:.2}</strong></div>
<div class="notice info">This application provides an algorithmic estimate and does not constitute medical advice.</div>
"#,
		prediction.probability
	)
}

fn escape(s: &str) -> String {
	let mut out = String::with_capacity(s.len());
	for c in s.chars() {
		match c {
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'&' => out.push_str("&amp;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&#39;"),
			c => out.push(c),
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn blank_form_uses_defaults() {
		let html = render(&PatientRecord::default(), None);

		assert!(html.contains(r#"name="age" min="10" max="100" step="1" value="50""#));
		assert!(html.contains(r#"name="sbp" min="80" max="250" step="0.01" value="140""#));
		assert!(html.contains(r#"<option value="Present" selected>"#));
		assert!(!html.contains("Analysis result"));
	}

	#[test]
	fn result_shows_label_and_rounded_probability() {
		let prediction = Prediction { label: RiskLabel::High, probability: 0.876 };
		let html = render(&PatientRecord::default(), Some(&Outcome::Predicted(prediction)));

		assert!(html.contains("High risk detected"));
		assert!(html.contains("<strong>0.88</strong>"));
		assert!(html.contains("<th>sbp</th><th>ldl</th><th>adiposity</th><th>obesity</th><th>age</th><th>famhist</th>"));
	}

	#[test]
	fn low_risk_result() {
		let prediction = Prediction { label: RiskLabel::Low, probability: 0.1 };
		let html = render(&PatientRecord::default(), Some(&Outcome::Predicted(prediction)));

		assert!(html.contains("Low risk detected"));
		assert!(html.contains("<strong>0.10</strong>"));
	}

	#[test]
	fn messages_are_escaped() {
		let html = render(&PatientRecord::default(), Some(&Outcome::Failed("<script>".into())));
		assert!(html.contains("&lt;script&gt;"));
		assert!(!html.contains("<script>"));
	}
}
