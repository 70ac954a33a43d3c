// src/api/config.rs

/// Default base URL for an OpenAI-compatible chat completions API.
pub const BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4o";

pub const INTERPRETER_TEMPERATURE: f32 = 0.5;
pub const GENERATOR_TEMPERATURE: f32 = 0.6;
pub const VALIDATOR_TEMPERATURE: f32 = 0.2;

/// System prompt for the request interpreter.
pub const INTERPRETER_SYSTEM_PROMPT: &str = "
You are a structured data generator. Your output must be a single valid JSON object.
Use standard array notation like [\"item1\", \"item2\"] for arrays, never {\"0\": \"item1\"}.
";

/// Instructions appended to the user's description for the request interpreter.
pub const INTERPRETER_INSTRUCTIONS: &str = "
Analyze the request above and extract structured data describing the website.
- Identify the kind of website (portfolio, business, landing page, e-commerce) and organize content accordingly.
- Include a \"websiteTheme\" field describing the visual theme.
- Include a \"website_structure\" field with value \"multi-page\" or \"single-page\".
- For multi-page websites include a \"pages\" array with the name of every page.
- Fill missing sections with sensible placeholder content, but keep any details the user gave exactly as given.
Return only a valid JSON object, with no extra text.
";

/// System prompt for the code generator.
pub const GENERATOR_SYSTEM_PROMPT: &str = "
You are a senior front-end developer building modern, responsive static websites with HTML, Tailwind CSS and vanilla JavaScript.
Rules:
1. Use semantic HTML (header, nav, main, section, footer) and alt attributes on every image.
2. The navigation must collapse into a toggled hamburger menu on small screens. Header text must never overlap.
3. Reference every image as src=\"images/<filename>\", whatever path the input uses.
4. If website_structure is \"multi-page\", create one HTML file per entry in \"pages\". The home page is \"index.html\", other pages are \"<page-name>.html\".
5. Every page shares the same header, navigation and footer.
6. When SEO details are missing, add a <title>, a meta description and Open Graph tags derived from the website's purpose.
Return a valid JSON object whose keys are filenames (\"index.html\", \"styles.css\", \"script.js\", other pages) and whose values are the complete file contents. No markdown, no explanations.
";

/// System prompt for the validator.
pub const VALIDATOR_SYSTEM_PROMPT: &str = "
You are a professional web developer. Your only job is to fix existing website code.
Return only a valid JSON object mapping each filename to its fixed content, nothing else.
";

/// Instructions sent with the files to the validator.
pub const VALIDATOR_INSTRUCTIONS: &str = "
Review and fix the website files above.
1. Fix any HTML, CSS or JavaScript errors.
2. Make sure all content from the structured input is displayed.
3. Make the site fully responsive: header and navigation text must not overlap, and the navigation must collapse into the mobile menu on small screens.
4. Improve animations and interactions where appropriate.
5. Make images responsive and properly sized, keeping their aspect ratio.
6. Keep navigation, header and footer consistent across pages.
Strict rules: do NOT add or remove pages. Return exactly the same files that were provided, with your fixes.
";
