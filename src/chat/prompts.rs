/// Starter questions offered while a session is still empty.
pub fn suggested_questions(subject: Option<&str>) -> Vec<String> {
    match subject {
        Some(subject) => vec![
            format!("Explain the key concepts in {}", subject),
            format!("What are common mistakes in {}?", subject),
            format!("Give me practice problems for {}", subject),
        ],
        None => vec![
            "How can I improve my study habits?".to_string(),
            "Explain algorithms in simple terms".to_string(),
            "Help me understand data structures".to_string(),
        ],
    }
}

pub fn banner(subject: Option<&str>) -> String {
    match subject {
        Some(subject) => format!("Helping you with {}", subject),
        None => "Your personal AI tutor".to_string(),
    }
}
