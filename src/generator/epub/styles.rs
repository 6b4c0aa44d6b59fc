//! Stylesheet shared by every document in the package.

pub const STYLESHEET: &str = r#"/* Base styles */
body {
    font-family: serif;
    line-height: 1.5;
    margin: 1em;
}

h1 {
    font-size: 2em;
    text-align: center;
    margin: 1em 0;
}

h2 {
    font-size: 1.5em;
    margin: 1em 0 0.5em;
}

h3, h4, h5, h6 {
    margin: 1em 0 0.5em;
}

p {
    margin: 0.5em 0;
    text-align: justify;
}

pre {
    font-family: monospace;
    white-space: pre-wrap;
}

/* Title page */
.title-page {
    text-align: center;
    margin-top: 20%;
}

.title-page .author {
    font-size: 1.25em;
    margin-top: 2em;
}

.title-page .contributor,
.title-page .publisher {
    font-style: italic;
}

.cover img {
    max-width: 100%;
    max-height: 60vh;
}

/* Pictures */
.picture {
    text-align: center;
    margin: 1em 0;
}

.picture img {
    max-width: 100%;
}

.caption {
    font-size: 0.9em;
    font-style: italic;
    text-align: center;
}

/* Credits */
.credits ul {
    list-style: none;
    padding: 0;
}

.credits .generated {
    font-size: 0.8em;
    color: #666;
}
"#;
