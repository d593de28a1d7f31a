/// Convert a path to POSIX form and resolve `.` and `..` segments lexically.
pub fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let (prefix, rest) = split_root(&path);

    let mut segments: Vec<&str> = Vec::new();
    for segment in rest.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(segments.last(), Some(last) if *last != "..") {
                    segments.pop();
                } else if prefix.is_empty() {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if prefix.is_empty() {
        if joined.is_empty() {
            ".".to_string()
        } else {
            joined
        }
    } else {
        format!("{}{}", prefix, joined)
    }
}

/// Split off the root (`/` or `C:/`) of an already slash-converted path.
fn split_root(path: &str) -> (&str, &str) {
    let bytes = path.as_bytes();
    if bytes.len() >= 3 && bytes[1] == b':' && bytes[2] == b'/' && bytes[0].is_ascii_alphabetic() {
        return path.split_at(3);
    }
    if path.starts_with('/') {
        return path.split_at(1);
    }
    ("", path)
}

pub fn is_absolute(path: &str) -> bool {
    !split_root(&path.replace('\\', "/")).0.is_empty()
}

/// Parent directory of `path`; the root is its own parent.
pub fn dirname(path: &str) -> String {
    let normalized = normalize_path(path);
    let (prefix, rest) = split_root(&normalized);
    match rest.rfind('/') {
        Some(index) => format!("{}{}", prefix, &rest[..index]),
        None if !prefix.is_empty() => prefix.to_string(),
        None => ".".to_string(),
    }
}

/// Join `relative` onto `base`. An absolute `relative` replaces `base`.
pub fn join(base: &str, relative: &str) -> String {
    if is_absolute(relative) {
        return normalize_path(relative);
    }
    normalize_path(&format!("{}/{}", base, relative))
}
