//! Generation request message.
//!
//! The webhook receives the form as a Spanish natural-language message. The
//! output-format section mirrors what the heuristic parser recognizes, so a
//! model that ignores JSON still produces parseable text.

use crate::domain::session::distribution_summary;
use crate::domain::{PhaseMinutes, SessionRequest};

const OUTPUT_INSTRUCTION: &str = "Responde únicamente con el siguiente formato:\n";

const OUTPUT_TEMPLATE: &str = "\
📘 <título de la sesión>
Tema: <tema>
Competencia: <competencia y nivel esperado>
Duración: <duración total>
Contexto: <contexto social>
1. Inicio:
- <actividad>
2. Desarrollo:
- <actividad>
3. Cierre:
- <actividad>
✅ Criterios de evaluación
- <criterio>";

/// Build the message sent to the generation service for a validated form
pub fn build_generation_message(request: &SessionRequest) -> String {
  let phases = PhaseMinutes::for_hours(request.horas_clase);
  let mut message = String::new();

  message.push_str(
    "Genera una sesión de aprendizaje de matemática para secundaria alineada al currículo nacional.\n\n",
  );
  message.push_str(&format!("Tema: {}\n", request.tema.trim()));

  message.push_str("Competencias:\n");
  for competencia in &request.competencias_seleccionadas {
    message.push_str(&format!("- {}\n", competencia.trim()));
  }

  message.push_str(&format!(
    "Ciclo: {} ({})\n",
    request.ciclo.as_str(),
    request.ciclo.description()
  ));
  message.push_str(&format!("Nivel esperado: {}\n", request.ciclo.expected_level()));
  message.push_str(&format!("Contexto social: {}\n", request.contexto.trim()));
  message.push_str(&format!(
    "Horas de clase: {} ({} minutos en total)\n",
    request.horas_clase,
    request.total_minutes()
  ));
  message.push_str(&format!(
    "Tiempos sugeridos: Inicio {} min, Desarrollo {} min, Cierre {} min\n",
    phases.inicio, phases.desarrollo, phases.cierre
  ));
  message.push_str(&format!("{}\n", distribution_summary(request.horas_clase)));
  message.push_str(&format!(
    "Materiales disponibles: {}\n\n",
    request.materiales_disponibles.trim()
  ));

  message.push_str(
    "Incluye los procesos didácticos de matemática (familiarización con el problema, \
     búsqueda y ejecución de estrategias, socialización de representaciones, reflexión y \
     formalización, planteamiento de otros problemas) y actividades adaptadas al contexto.\n\n",
  );
  message.push_str(OUTPUT_INSTRUCTION);
  message.push_str(OUTPUT_TEMPLATE);

  message
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Ciclo;
  use crate::normalizer::heuristic;

  fn request() -> SessionRequest {
    SessionRequest {
      tema: " Funciones lineales ".into(),
      competencias_seleccionadas: vec![
        "Resuelve problemas de regularidad, equivalencia y cambios".into(),
        "Resuelve problemas de cantidad".into(),
      ],
      ciclo: Ciclo::VII,
      contexto: "Pesquero".into(),
      horas_clase: 2,
      materiales_disponibles: "calculadoras, reglas".into(),
    }
  }

  #[test]
  fn test_message_lists_form_fields() {
    let message = build_generation_message(&request());
    assert!(message.contains("Tema: Funciones lineales\n"));
    assert!(message.contains("- Resuelve problemas de regularidad, equivalencia y cambios\n"));
    assert!(message.contains("- Resuelve problemas de cantidad\n"));
    assert!(message.contains("Ciclo: VII (3º, 4º y 5º de secundaria (14-17 años))"));
    assert!(message.contains("Contexto social: Pesquero"));
    assert!(message.contains("Horas de clase: 2 (90 minutos en total)"));
    assert!(message.contains("Inicio 18 min, Desarrollo 54 min, Cierre 18 min"));
    assert!(message.contains("Hora 2: Reflexión y cierre"));
    assert!(message.contains("Materiales disponibles: calculadoras, reglas"));
  }

  #[test]
  fn test_output_format_is_parseable_template() {
    let parsed = heuristic::parse(OUTPUT_TEMPLATE);
    assert_eq!(parsed.record.title.as_deref(), Some("<título de la sesión>"));
    let headings: Vec<&str> = parsed
      .record
      .didactic_processes
      .iter()
      .map(|p| p.heading.as_str())
      .collect();
    assert_eq!(headings, vec!["Inicio", "Desarrollo", "Cierre"]);
    assert_eq!(parsed.record.evaluation_criteria.len(), 1);
    assert_eq!(parsed.unmatched_lines, 0);
  }
}
