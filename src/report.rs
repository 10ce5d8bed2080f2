//! Human-readable report and JSON payload for an [`Analysis`]

use std::fmt;

use crate::indicators::IndicatorKind;
use crate::Analysis;

const RULE: &str = "-------------------------------------------";

fn icon(kind: IndicatorKind) -> &'static str {
    match kind {
        IndicatorKind::MovingAverages => "📊",
        IndicatorKind::Rsi => "💪",
        IndicatorKind::Macd => "📈",
        IndicatorKind::Bollinger => "🌊",
        IndicatorKind::Ichimoku => "☁️",
        IndicatorKind::Fibonacci => "🏛️",
        IndicatorKind::Volume => "🔊",
    }
}

/// Multi-line report: heading, one numbered section per indicator, decision
pub fn render(analysis: &Analysis) -> String {
    Report(analysis).to_string()
}

/// [`Display`](fmt::Display) view of an [`Analysis`] as the text report
#[derive(Debug, Clone, Copy)]
pub struct Report<'a>(pub &'a Analysis);

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let analysis = self.0;
        writeln!(f, "Análise Técnica para {} ({})", analysis.symbol, analysis.timeframe)?;
        writeln!(f, "{RULE}")?;

        for (i, kind) in IndicatorKind::ALL.iter().enumerate() {
            let detail = analysis
                .verdicts
                .get(*kind)
                .map(|v| v.detail.as_str())
                .unwrap_or("Indisponível.");
            writeln!(f)?;
            writeln!(f, "{} {}. {}", icon(*kind), i + 1, kind.title())?;
            writeln!(f, "{detail}")?;
        }

        let d = &analysis.decision;
        writeln!(f)?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "🎯 Decisão Final Sugerida")?;
        write!(
            f,
            "Operação: {} (Confiança: {})",
            d.operation.label(),
            d.confidence.label()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DecisionPayload {
    pub operacao: String,
    pub justificativa: String,
    pub confianca: String,
}

/// JSON body returned to clients
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Payload {
    pub analise: String,
    pub decisao: DecisionPayload,
}

impl Payload {
    pub fn new(analysis: &Analysis) -> Self {
        let text = render(analysis);
        let d = &analysis.decision;
        Self {
            analise: text.clone(),
            decisao: DecisionPayload {
                operacao: d.operation.label().to_lowercase(),
                justificativa: text,
                confianca: d.confidence.label().to_string(),
            },
        }
    }
}

impl From<&Analysis> for Payload {
    fn from(analysis: &Analysis) -> Self {
        Self::new(analysis)
    }
}
