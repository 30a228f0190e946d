#[cfg(test)]
pub mod fixtures {
    use serde_json::json;

    /// Roughly 250 words of academic biology notes, one paragraph per line.
    pub fn photosynthesis_text() -> String {
        [
            "Photosynthesis is the process by which green plants, algae and some bacteria convert light energy into chemical energy stored in glucose. The process takes place mainly in the chloroplasts of leaf cells, where the pigment chlorophyll absorbs red and blue light and reflects green light.",
            "The overall reaction combines six molecules of carbon dioxide and six molecules of water to produce one molecule of glucose and six molecules of oxygen. Light energy drives this reaction; without it the mechanism stops.",
            "Photosynthesis happens in two connected stages. The light-dependent reactions occur in the thylakoid membranes. Here light splits water molecules, releasing oxygen as a by-product, and the captured energy is stored in ATP and NADPH. The structure of the thylakoid stack increases the surface area available for this stage.",
            "The light-independent reactions, also called the Calvin cycle, occur in the stroma. The enzyme RuBisCO fixes carbon dioxide, and ATP and NADPH from the first stage power the reduction of the fixed carbon into sugar. The function of this cycle is to build carbohydrates that the plant uses for growth and respiration.",
            "Several factors limit the rate of photosynthesis: light intensity, carbon dioxide concentration and temperature. A classic experiment shows the effect of light intensity by counting oxygen bubbles released by pondweed at different distances from a lamp. The result supports the hypothesis that the rate rises with light until another factor becomes limiting.",
            "Photosynthesis is the foundation of most food chains, and it maintains the oxygen content of the atmosphere.",
        ]
        .join("\n")
    }

    /// A well-formed study pack as the model would return it, without fences.
    pub fn valid_study_pack_json() -> String {
        json!({
            "summary": {
                "overview": "Photosynthesis converts light energy into chemical energy stored in glucose.",
                "keyPoints": [
                    "It happens in the chloroplasts",
                    "It has light-dependent and light-independent stages"
                ],
                "definitions": [
                    { "term": "Chlorophyll", "definition": "The green pigment that absorbs light" }
                ],
                "importantConcepts": ["Calvin cycle", "Limiting factors"]
            },
            "flashcards": [
                { "question": "Where does photosynthesis take place?", "answer": "In the chloroplasts" },
                { "question": "What gas is released as a by-product?", "answer": "Oxygen" }
            ],
            "quiz": [
                {
                    "question": "Which enzyme fixes carbon dioxide in the Calvin cycle?",
                    "options": ["Amylase", "RuBisCO", "Catalase", "Lipase"],
                    "correct": 1,
                    "explanation": "RuBisCO fixes carbon dioxide in the stroma."
                },
                {
                    "question": "Where do the light-dependent reactions occur?",
                    "options": ["Stroma", "Nucleus", "Thylakoid membranes", "Cell wall"],
                    "correct": 2,
                    "explanation": "They occur in the thylakoid membranes."
                }
            ]
        })
        .to_string()
    }
}

#[cfg(test)]
pub mod stub_server {
    use actix_web::{web, App, HttpServer};

    /// Serves `configure` on an ephemeral local port and returns its base URL.
    /// The server lives until the test runtime shuts down.
    pub fn start(configure: fn(&mut web::ServiceConfig)) -> String {
        let server = HttpServer::new(move || App::new().configure(configure))
            .workers(1)
            .disable_signals()
            .bind(("127.0.0.1", 0))
            .expect("stub server binds to an ephemeral port");
        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());
        format!("http://{}", addr)
    }
}

#[cfg(test)]
pub mod test_helpers {
    use actix_web::http::StatusCode;

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }

    /// Asserts that an error body carries the fields clients rely on.
    pub fn assert_error_body(body: &serde_json::Value, status: StatusCode) {
        assert!(body["error"].is_string(), "missing error message: {}", body);
        assert_eq!(body["code"], status.as_u16());
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::test_helpers::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_photosynthesis_fixture_is_long_enough() {
        let text = photosynthesis_text();
        assert!(text.split_whitespace().count() > 200);
        assert!(text.starts_with("Photosynthesis"));
    }

    #[test]
    fn test_study_pack_fixture_is_valid_json() {
        let value: serde_json::Value = serde_json::from_str(&valid_study_pack_json()).unwrap();
        assert_eq!(value["quiz"][0]["options"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_assert_error_helpers() {
        assert_error_status(StatusCode::BAD_REQUEST);
        assert_error_body(
            &serde_json::json!({ "error": "bad", "code": 400 }),
            StatusCode::BAD_REQUEST,
        );
    }
}
