use api::{HistoryView, Request, Response, Suggestion};

pub fn print_request(request: &Request) {
    println!("{} {}", request.method, request.url);
    for h in &request.headers {
        println!("  {}: {}", h.key, h.value);
    }
    for p in &request.params {
        println!("  ?{}={}", p.key, p.value);
    }
}

pub fn print_response(response: &Response) {
    let outcome = if response.is_transport_failure() {
        "Failed (no response)"
    } else if response.is_success() {
        "Success"
    } else {
        "Failed"
    };
    println!(
        "Status: {} {} - {}",
        response.status_code, response.status_text, outcome
    );
    println!(
        "Time: {}ms  Size: {:.2}KB",
        response.time_ms,
        response.size_bytes as f64 / 1024.0
    );
    let body = serde_json::to_string_pretty(&response.body).unwrap_or_else(|_| response.body.to_string());
    println!("{}", body);
}

pub fn print_history(view: &HistoryView) {
    if view.is_empty() {
        println!("No history found. Run some tests!");
        return;
    }
    for entry in view {
        let status = match &entry.response {
            Some(res) => format!("{} {}  {}ms", res.status_code, res.status_text, res.time_ms),
            None => String::from("no response"),
        };
        println!(
            "{}  {:<6} {}  {}  {}",
            entry.id(),
            entry.request.method,
            entry.request.url,
            status,
            entry.executed_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
}

pub fn print_suggestion(suggestion: &Suggestion) {
    println!();
    println!("Documentation");
    println!("  {}", suggestion.documentation);
    if !suggestion.improvements.is_empty() {
        println!("Improvements");
        for item in &suggestion.improvements {
            println!("  - {}", item);
        }
    }
    if !suggestion.security.is_empty() {
        println!("Security");
        for item in &suggestion.security {
            println!("  - {}", item);
        }
    }
    println!("Schema updates");
    println!("  {}", suggestion.schema_updates);
    println!("Code");
    for line in suggestion.code_snippet.lines() {
        println!("  {}", line);
    }
}
